use serde::{Deserialize, Serialize};

// =============================================================================
// Content
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }

    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

// =============================================================================
// Generate Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                temperature: None,
                max_output_tokens: 2048,
            },
        }
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        if !instruction.is_empty() {
            self.system_instruction = Some(Content::system(instruction));
        }
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.generation_config.temperature = temperature;
        self
    }
}

// =============================================================================
// Generate Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    /// Flattened text some gateways add next to the raw candidates.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Response text, trimmed. Prefers the flattened `text` field and falls
    /// back to the first candidate whose parts carry any text.
    pub fn text(&self) -> Option<String> {
        let direct = self.text.as_deref().map(str::trim).unwrap_or_default();
        if !direct.is_empty() {
            return Some(direct.to_string());
        }

        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .map(|c| c.joined_text().trim().to_string())
            .find(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let req = GenerateRequest::new("produto: faca")
            .system_instruction("classifique")
            .temperature(Some(0.2));
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "classifique");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "produto: faca");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn empty_system_instruction_is_omitted() {
        let req = GenerateRequest::new("x").system_instruction("");
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn text_prefers_flattened_field() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"text": "  PERMITIDO: ok  ", "candidates": [{"content": {"parts": [{"text": "other"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("PERMITIDO: ok"));
    }

    #[test]
    fn text_falls_back_to_candidate_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"text": "", "candidates": [
                {"content": {"parts": []}, "finishReason": "SAFETY"},
                {"content": {"role": "model", "parts": [{"text": "PROIBIDO: "}, {"text": "arma"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("PROIBIDO: arma"));
    }

    #[test]
    fn text_none_when_nothing_present() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#).unwrap();
        assert!(resp.text().is_none());
    }
}
