use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
///
/// Nested keys are addressed with a double underscore, e.g.
/// `HELPDESK_QUEUE__NAME=ticket-intake`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("HELPDESK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[database]
table = "requesters"

[queue]
name = "ticket-intake"

[notifier]
channel = "it-ops"

[mailer]
sender = "support@example.com"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.queue.name, "ticket-intake");
    }

    #[test]
    fn test_load_config_from_str_missing_mailer() {
        let toml = r#"
[database]
table = "requesters"

[queue]
name = "ticket-intake"

[notifier]
channel = "it-ops"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[database]
path = "/tmp/helpdesk-test.db"
table = "requesters"

[queue]
name = "ticket-intake"
batch_size = 25

[notifier]
channel = "it-ops"
webhook_url = "http://localhost:9999/hook"

[mailer]
sender = "support@example.com"

[sweeper]
enabled = false
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.queue.batch_size, 25);
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("http://localhost:9999/hook")
        );
        assert!(!config.sweeper.enabled);
    }
}
