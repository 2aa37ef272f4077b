//! Keyword weight table used for urgency scoring.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeywordTableError {
    #[error("Failed to read keyword table {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse keyword table: {0}")]
    Parse(String),

    #[error("Invalid keyword '{0}': keywords must be non-blank and lowercase")]
    InvalidKeyword(String),

    #[error("Keyword table is empty")]
    Empty,
}

/// Builtin weights, tiered from outage-level severity down to routine requests.
const BUILTIN_KEYWORDS: &[(&str, u32)] = &[
    // High severity
    ("data loss", 100),
    ("system down", 100),
    ("server down", 100),
    ("fatal", 100),
    ("virus", 100),
    ("outage", 100),
    ("failure", 100),
    ("system error", 60),
    // Medium-high severity
    ("clients affected", 50),
    ("critical", 50),
    ("urgent", 50),
    // Medium severity
    ("offline", 20),
    ("effective immediately", 20),
    ("spam", 20),
    ("some users", 15),
    ("end of day", 15),
    ("lock out", 15),
    ("lockout", 15),
    ("password", 15),
    ("vpn", 15),
    ("locked out", 15),
    ("phishing", 15),
    // Low-medium severity
    ("not working", 10),
    ("terminate", 10),
    ("disable", 10),
    ("error", 10),
    ("minor bug", 10),
    ("bug", 10),
    ("update", 10),
    ("login", 10),
    // Low severity
    ("question", 5),
    ("reset", 5),
    ("slow", 5),
    ("not opening", 5),
    ("new hire", 5),
    ("hire", 5),
    ("onboarding", 5),
    ("set-up", 5),
    ("set up", 5),
    ("print", 5),
    ("printing", 5),
    ("printer", 5),
    ("email", 5),
    ("new", 5),
    ("install", 5),
    ("how do i", 5),
    ("request", 5),
    ("order", 5),
];

/// Immutable mapping of lowercase keyword phrases to weights.
///
/// Built once at startup and shared by reference; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTable {
    entries: Vec<(String, u32)>,
}

impl KeywordTable {
    /// The table shipped with the service.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_KEYWORDS
                .iter()
                .map(|(keyword, weight)| (keyword.to_string(), *weight))
                .collect(),
        }
    }

    /// Build a table from explicit entries.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, KeywordTableError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut table = Vec::new();
        for (keyword, weight) in entries {
            let keyword = keyword.into();
            if keyword.trim().is_empty() || keyword != keyword.to_lowercase() {
                return Err(KeywordTableError::InvalidKeyword(keyword));
            }
            table.push((keyword, weight));
        }
        if table.is_empty() {
            return Err(KeywordTableError::Empty);
        }
        Ok(Self { entries: table })
    }

    /// Parse a TOML document of `"keyword" = weight` pairs.
    pub fn from_toml_str(s: &str) -> Result<Self, KeywordTableError> {
        let parsed: BTreeMap<String, u32> =
            toml::from_str(s).map_err(|e| KeywordTableError::Parse(e.to_string()))?;
        Self::from_entries(parsed)
    }

    /// Load a TOML keyword file.
    pub fn load(path: &Path) -> Result<Self, KeywordTableError> {
        let content = std::fs::read_to_string(path).map_err(|e| KeywordTableError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn weight(&self, keyword: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, w)| *w)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}
