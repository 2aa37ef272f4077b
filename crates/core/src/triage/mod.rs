//! Urgency triage: keyword table and scoring.

mod keywords;
mod scorer;

pub use keywords::{KeywordTable, KeywordTableError};
pub use scorer::{score, Urgency, UrgencyScore, UrgencyScorer};
