//! Keyword-weighted urgency scoring.
//!
//! Scores title and description independently: each keyword counts once per
//! field, and the description contributes at half weight.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::KeywordTable;

/// Combined-score thresholds, checked from the highest level down.
const LEVEL_THRESHOLDS: [(u32, u8); 4] = [(100, 5), (80, 4), (60, 3), (40, 2)];

/// Urgency level, 1 (lowest) to 5 (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Urgency(u8);

impl Urgency {
    pub const LOWEST: Urgency = Urgency(1);
    pub const HIGHEST: Urgency = Urgency(5);

    /// Bucket a combined score given as twice its value, so half-weighted
    /// description points compare exactly.
    fn from_doubled_score(doubled: u64) -> Self {
        LEVEL_THRESHOLDS
            .iter()
            .find(|(threshold, _)| doubled >= 2 * u64::from(*threshold))
            .map(|(_, level)| Urgency(*level))
            .unwrap_or(Urgency::LOWEST)
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Breakdown of one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgencyScore {
    pub urgency: Urgency,
    pub title_score: u32,
    pub description_score: u32,
    pub title_keywords: Vec<String>,
    pub description_keywords: Vec<String>,
}

impl UrgencyScore {
    fn unscored() -> Self {
        Self {
            urgency: Urgency::LOWEST,
            title_score: 0,
            description_score: 0,
            title_keywords: Vec::new(),
            description_keywords: Vec::new(),
        }
    }

    /// `title_score + description_score / 2`.
    pub fn combined(&self) -> f64 {
        f64::from(self.title_score) + f64::from(self.description_score) / 2.0
    }
}

/// Score a ticket's text against `table`.
///
/// An empty title or description short-circuits to the lowest urgency.
pub fn score(table: &KeywordTable, title: &str, description: &str) -> UrgencyScore {
    if title.is_empty() || description.is_empty() {
        return UrgencyScore::unscored();
    }

    let title_lower = title.to_lowercase();
    let description_lower = description.to_lowercase();

    let mut result = UrgencyScore::unscored();
    for (keyword, weight) in table.iter() {
        if contains_phrase(&title_lower, keyword) {
            result.title_score += weight;
            result.title_keywords.push(keyword.to_string());
        }
        if contains_phrase(&description_lower, keyword) {
            result.description_score += weight;
            result.description_keywords.push(keyword.to_string());
        }
    }

    let doubled = 2 * u64::from(result.title_score) + u64::from(result.description_score);
    result.urgency = Urgency::from_doubled_score(doubled);
    result
}

/// Scorer bound to a shared keyword table.
#[derive(Debug, Clone)]
pub struct UrgencyScorer {
    table: Arc<KeywordTable>,
}

impl UrgencyScorer {
    pub fn new(table: Arc<KeywordTable>) -> Self {
        Self { table }
    }

    pub fn score(&self, title: &str, description: &str) -> UrgencyScore {
        score(&self.table, title, description)
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True if `phrase` occurs in `text` with no word character directly before
/// or after it.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.char_indices().any(|(start, _)| {
        if !text[start..].starts_with(phrase) {
            return false;
        }
        let end = start + phrase.len();
        let clear_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let clear_after = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
        clear_before && clear_after
    })
}
