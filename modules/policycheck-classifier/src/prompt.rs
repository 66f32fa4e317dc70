//! Classification prompt construction.
//!
//! Both providers receive exactly the same system instruction and prompt
//! body; there is a single copy of the text.

use policycheck_common::PolicyCorpus;

/// Role and output contract sent as the backend's system instruction.
pub const SYSTEM_INSTRUCTION: &str = "\
Você é um especialista nas políticas de produtos proibidos e restritos da Shopee Brasil. \
Sua tarefa é dizer se um anúncio pode ser publicado, usando SOMENTE as políticas fornecidas.

Responda em uma única linha, exatamente no formato:
VEREDITO: explicação

onde VEREDITO é uma destas palavras, em maiúsculas:
- PERMITIDO: o produto pode ser anunciado.
- PROIBIDO: o produto não pode ser anunciado.
- DEPENDE: falta um dado quantitativo (medida, volume, potência) para decidir.
- RESTRITO: o anúncio exige autorização ou documentação do vendedor.

Na explicação, cite a política usada no formato \"Segundo a política <número>. <NOME>\".";

/// Decision heuristics placed between the corpus and the product description.
pub const CLASSIFICATION_RULES: &str = "\
REGRAS DE DECISÃO:
1. Produtos falsificados, réplicas ou imitações de marca são sempre PROIBIDO, independentemente da categoria.
2. Use a política mais específica que se aplica ao produto; só recorra a uma política genérica quando nenhuma específica se aplicar.
3. Limites numéricos: se a descrição informa uma medida e a política define um limite, compare os valores. \
Medida igual ou abaixo do limite: PERMITIDO. Medida acima do limite: PROIBIDO. \
Se a política define um limite e a descrição não informa a medida: DEPENDE.
4. Se a política aplicável exige autorização, licença, registro ou documentação, o veredito é RESTRITO, \
mesmo que as regras anteriores indiquem PERMITIDO ou PROIBIDO.
5. Responda apenas no formato VEREDITO: explicação, sem colchetes e sem texto adicional antes do veredito.";

/// What gets sent to a backend for one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationPrompt {
    pub system_instruction: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_instruction: String,
    rules: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(SYSTEM_INSTRUCTION)
    }
}

impl PromptBuilder {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            rules: CLASSIFICATION_RULES.to_string(),
        }
    }

    pub fn build(&self, product_description: &str, corpus: &PolicyCorpus) -> ClassificationPrompt {
        let prompt = format!(
            "POLÍTICAS DA SHOPEE:\n\n{corpus}\n\n{rules}\n\nPRODUTO A ANALISAR:\n{product}",
            corpus = corpus.render(),
            rules = self.rules,
            product = product_description.trim(),
        );

        ClassificationPrompt {
            system_instruction: self.system_instruction.clone(),
            prompt,
        }
    }
}
