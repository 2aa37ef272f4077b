//! Service configuration: TOML file plus `HELPDESK_` environment overrides.

mod loader;
mod types;
mod validate;

pub use loader::*;
pub use types::*;
pub use validate::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed, but a value is unusable (blank identifier, zero size, ...).
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
