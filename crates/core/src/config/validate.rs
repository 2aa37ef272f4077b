use super::{types::Config, ConfigError};
use crate::store::is_valid_identifier;

/// Validate configuration
///
/// Every collaborator identifier must be non-blank; the process refuses to
/// start otherwise.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    require("queue.name", &config.queue.name)?;
    require("database.table", &config.database.table)?;
    require("notifier.channel", &config.notifier.channel)?;
    require("mailer.sender", &config.mailer.sender)?;

    if !is_valid_identifier(&config.database.table) {
        return Err(ConfigError::ValidationError(format!(
            "database.table '{}' must contain only letters, digits and underscores",
            config.database.table
        )));
    }

    if config.queue.buffer_size == 0 || config.queue.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "queue.buffer_size and queue.batch_size must be greater than 0".to_string(),
        ));
    }

    if config.queue.max_deliveries == 0 {
        return Err(ConfigError::ValidationError(
            "queue.max_deliveries must be at least 1".to_string(),
        ));
    }

    if config.sweeper.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.page_size must be greater than 0".to_string(),
        ));
    }

    if config.sweeper.stale_after_secs <= 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.stale_after_secs must be positive".to_string(),
        ));
    }

    if config.sweeper.enabled && config.sweeper.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sweeper.interval_secs cannot be 0 when the sweeper is enabled".to_string(),
        ));
    }

    Ok(())
}

fn require(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!("{} is required", key)));
    }
    Ok(())
}
