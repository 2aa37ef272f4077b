//! Periodic detection of tickets left open past the staleness threshold.

mod pages;
mod runner;
mod types;

pub use pages::RecordPages;
pub use runner::{mark_stale, StalenessSweeper, STALE_ALERT_SUBJECT};
pub use types::{StaleEvent, SweepFailure, SweepReport};
