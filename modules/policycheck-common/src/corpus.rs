//! The policy corpus: an ordered list of named categories with rule text and
//! an optional help-centre link.
//!
//! Loaded once at startup and treated as read-only by classification. The
//! only mutation is [`PolicyCorpus::assign_link`], which callers apply to a
//! copy and then persist and swap in.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::PolicyError;

/// Registrable domain every reference link must live under.
pub const ALLOWED_LINK_DOMAIN: &str = "shopee.com.br";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCategory {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "conteudo", alias = "content", default)]
    pub content: String,
}

impl PolicyCategory {
    pub fn new(
        name: impl Into<String>,
        link: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            content: content.into(),
        }
    }

    pub fn has_link(&self) -> bool {
        !self.link.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyCorpus {
    categories: Vec<PolicyCategory>,
}

impl PolicyCorpus {
    pub fn new(categories: Vec<PolicyCategory>) -> Self {
        Self { categories }
    }

    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(json).map_err(|e| PolicyError::Corpus(format!("invalid corpus JSON: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PolicyError::Corpus(format!("failed to read {}: {e}", path.display()))
        })?;
        let corpus = Self::from_json(&json)?;
        info!(path = %path.display(), categories = corpus.len(), "Policy corpus loaded");
        Ok(corpus)
    }

    /// Write the corpus as pretty JSON, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), PolicyError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PolicyError::Corpus(format!("failed to serialize corpus: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace {}", path.display()))?;

        debug!(path = %path.display(), categories = self.len(), "Policy corpus saved");
        Ok(())
    }

    pub fn categories(&self) -> &[PolicyCategory] {
        &self.categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyCategory> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look a category up by name, case-insensitively.
    ///
    /// An exact match wins. Next, the first category in corpus order whose
    /// name contains `name`; last, the first whose name is contained in
    /// `name`. Substring matches must start at a word boundary, so
    /// "1. ALIMENTOS" never matches inside "11. ALIMENTOS ...".
    pub fn find(&self, name: &str) -> Option<&PolicyCategory> {
        let needle = normalize(name);
        if needle.is_empty() {
            return None;
        }

        if let Some(exact) = self.categories.iter().find(|c| normalize(&c.name) == needle) {
            return Some(exact);
        }

        self.categories
            .iter()
            .find(|c| contains_at_word_start(&normalize(&c.name), &needle))
            .or_else(|| {
                self.categories.iter().find(|c| {
                    let hay = normalize(&c.name);
                    !hay.is_empty() && contains_at_word_start(&needle, &hay)
                })
            })
    }

    /// Category currently holding `link`, if any.
    pub fn category_for_link(&self, link: &str) -> Option<&PolicyCategory> {
        let link = link.trim();
        self.categories.iter().find(|c| c.has_link() && c.link.trim() == link)
    }

    /// Render every category as `"{name}\n{content}"`, separated by blank lines.
    pub fn render(&self) -> String {
        self.categories
            .iter()
            .map(|c| format!("{}\n{}", c.name, c.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Bind a reference link to the category named exactly `category_name`
    /// (case-insensitive). Returns `false` when the category already had that
    /// link.
    pub fn assign_link(&mut self, category_name: &str, link: &str) -> Result<bool, PolicyError> {
        let link = link.trim();
        if !is_allowed_link(link) {
            return Err(PolicyError::Validation(format!(
                "link must be an https URL under {ALLOWED_LINK_DOMAIN}"
            )));
        }

        let target = normalize(category_name);
        let idx = self
            .categories
            .iter()
            .position(|c| normalize(&c.name) == target)
            .ok_or_else(|| PolicyError::NotFound(category_name.trim().to_string()))?;

        if let Some(owner) = self.category_for_link(link) {
            if normalize(&owner.name) != target {
                return Err(PolicyError::LinkConflict {
                    link: link.to_string(),
                    category: owner.name.clone(),
                });
            }
            return Ok(false);
        }

        let category = &mut self.categories[idx];
        info!(category = %category.name, link, "Assigning policy reference link");
        category.link = link.to_string();
        Ok(true)
    }
}

/// Whether `link` is an https URL on the allow-listed domain or a subdomain.
pub fn is_allowed_link(link: &str) -> bool {
    let Ok(parsed) = url::Url::parse(link.trim()) else {
        return false;
    };
    if parsed.scheme() != "https" {
        return false;
    }
    match parsed.host_str() {
        Some(host) => {
            let host = host.to_ascii_lowercase();
            host == ALLOWED_LINK_DOMAIN || host.ends_with(&format!(".{ALLOWED_LINK_DOMAIN}"))
        }
        None => false,
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whether `needle` occurs in `hay` at a position not preceded by a letter
/// or digit.
fn contains_at_word_start(hay: &str, needle: &str) -> bool {
    hay.match_indices(needle).any(|(i, _)| {
        hay[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}
