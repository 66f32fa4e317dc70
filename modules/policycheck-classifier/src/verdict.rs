use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Allowed.
    Permitido,
    /// Forbidden.
    Proibido,
    /// Missing a quantitative detail needed to decide.
    Depende,
    /// Requires authorization or documentation.
    Restrito,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Permitido,
        Verdict::Proibido,
        Verdict::Depende,
        Verdict::Restrito,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Permitido => "PERMITIDO",
            Verdict::Proibido => "PROIBIDO",
            Verdict::Depende => "DEPENDE",
            Verdict::Restrito => "RESTRITO",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Verdict::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| ClassifyError::MalformedOutput(token.to_string()))
    }
}

/// A validated model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub verdict: Verdict,
    pub explanation: String,
    pub reference_link: Option<String>,
}

impl ClassificationResult {
    /// Parse `VERDICT: explanation`. Markdown emphasis around the verdict
    /// (`**PROIBIDO**:`, `**PROIBIDO:**`) is tolerated; anything else before
    /// the verdict is not.
    pub fn parse(text: &str) -> Result<Self, ClassifyError> {
        let malformed = || ClassifyError::MalformedOutput(text.trim().to_string());

        let body = text.trim_start_matches(|c: char| c.is_whitespace() || is_emphasis(c));
        let (head, rest) = body.split_once(':').ok_or_else(malformed)?;

        let head = head.trim_end_matches(|c: char| c.is_whitespace() || is_emphasis(c));
        let verdict: Verdict = head.parse().map_err(|_| malformed())?;

        let explanation = rest
            .trim_start_matches(|c: char| c.is_whitespace() || is_emphasis(c))
            .trim_end()
            .to_string();

        Ok(Self {
            verdict,
            explanation,
            reference_link: None,
        })
    }

    pub fn with_reference_link(mut self, link: Option<String>) -> Self {
        self.reference_link = link;
        self
    }
}

fn is_emphasis(c: char) -> bool {
    matches!(c, '*' | '_' | '#')
}
