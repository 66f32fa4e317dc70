//! Corpus persistence: load from disk, assign a link, save, reload.

use policycheck_common::{PolicyCategory, PolicyCorpus, PolicyError};

fn write_corpus(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("policies.json");
    std::fs::write(
        &path,
        r#"[
  {"nome": "3. ARMAS", "link": "https://help.shopee.com.br/x", "conteudo": "Armas de fogo e munições são proibidas."},
  {"nome": "7. MEDICAMENTOS", "link": "", "conteudo": "Exigem registro na ANVISA."}
]"#,
    )
    .unwrap();
    path
}

#[test]
fn assigned_link_survives_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corpus(dir.path());

    let mut corpus = PolicyCorpus::load(&path).unwrap();
    assert!(corpus
        .assign_link("7. medicamentos", "https://help.shopee.com.br/medicamentos")
        .unwrap());
    corpus.save(&path).unwrap();

    let reloaded = PolicyCorpus::load(&path).unwrap();
    assert_eq!(reloaded, corpus);
    assert_eq!(
        reloaded.find("7. MEDICAMENTOS").unwrap().link,
        "https://help.shopee.com.br/medicamentos"
    );
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn saved_file_uses_portuguese_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    PolicyCorpus::new(vec![PolicyCategory::new("1. ALIMENTOS", "", "Perecíveis.")])
        .save(&path)
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["nome"], "1. ALIMENTOS");
    assert_eq!(raw[0]["conteudo"], "Perecíveis.");
    assert_eq!(raw[0]["link"], "");
}

#[test]
fn missing_file_is_a_corpus_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PolicyCorpus::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PolicyError::Corpus(_)));
}
