//! Response cleanup and policy citation.
//!
//! The model is asked to cite the policy it used ("Segundo a política 3.
//! ARMAS"). When the cited category exists in the corpus and has a
//! reference link, the link is appended after a blank line.

use std::sync::LazyLock;

use policycheck_common::PolicyCorpus;
use regex::Regex;

/// "política" (any case, accent optional), a dotted numeric prefix, then one
/// or more capitalized words.
static RE_POLICY_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i:pol[íi]tica)\s+(\d+(?:\.\d+)*\.?\s*\p{Lu}[\p{Lu}\p{Ll}\-]*(?:[ \t]+\p{Lu}[\p{Lu}\p{Ll}\-]*)*)",
    )
    .expect("valid citation regex")
});

/// Sanitized response plus the link that was cited, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Sanitized response without the appended link.
    pub body: String,
    /// `body`, followed by `"\n\n" + link` when a link was found.
    pub text: String,
    pub reference_link: Option<String>,
}

/// Trim and drop literal `[` / `]` characters.
pub fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '[' | ']'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Category name cited after the word "política", if any.
pub fn extract_category_name(text: &str) -> Option<String> {
    RE_POLICY_CITATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Sanitize `raw` and append the cited category's reference link.
///
/// When several categories match the cited name, the first in corpus order
/// wins (see [`PolicyCorpus::find`]). A link already present in the text is
/// not appended twice.
pub fn annotate_detailed(raw: &str, corpus: &PolicyCorpus) -> Annotation {
    let body = sanitize(raw);

    let reference_link = extract_category_name(&body)
        .and_then(|name| corpus.find(&name))
        .filter(|category| category.has_link())
        .map(|category| category.link.trim().to_string());

    let text = match reference_link {
        Some(ref link) if !body.contains(link.as_str()) => format!("{body}\n\n{link}"),
        _ => body.clone(),
    };

    Annotation {
        body,
        text,
        reference_link,
    }
}

pub fn annotate(raw: &str, corpus: &PolicyCorpus) -> String {
    annotate_detailed(raw, corpus).text
}
