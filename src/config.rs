//! Application configuration loaded from the environment.
//!
//! The configuration is read once at startup and handed to the handlers
//! inside [`AppState`](crate::webhook::AppState). Nothing else in the crate
//! reads process environment.
//!
//! # Security Notes
//! - Sensitive fields are clearly marked and should never be logged
//! - `AppConfig` intentionally does not implement `Debug`

use chrono_tz::Tz;
use derive_more::{Display, Error};
use envconfig::Envconfig;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;

/// Errors raised while validating the configuration at startup
#[derive(Debug, Display, Error)]
pub enum StartupError {
    #[display("REPLY_TIMEZONE is not a valid IANA timezone: {_0}")]
    InvalidTimezone(#[error(not(source))] String),
    #[display("LOG_LEVEL is not a valid log level: {_0}")]
    InvalidLogLevel(#[error(not(source))] String),
}

/// Application configuration.
///
/// Every field is read from the upper-cased environment variable of the
/// same name (e.g. `webhook_verify_token` <- `WEBHOOK_VERIFY_TOKEN`).
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// 🔒 SENSITIVE: shared secret expected in `hub.verify_token`
    pub webhook_verify_token: String,

    /// 🔒 SENSITIVE: Bearer token for the WhatsApp Graph API
    pub graph_api_token: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "3000")]
    pub port: u16,

    /// Base WebDAV collection the audio files are uploaded to (NON-SENSITIVE)
    /// Example: "https://cloud.example.com/remote.php/dav/files/bot/voice/"
    pub nextcloud_url: String,

    /// Nextcloud user for basic auth (SEMI-SENSITIVE)
    pub nextcloud_username: String,

    /// 🔒 SENSITIVE: Nextcloud password or app password
    pub nextcloud_password: String,

    /// Graph API root, including the API version (NON-SENSITIVE)
    #[envconfig(default = "https://graph.facebook.com/v18.0")]
    pub graph_api_base_url: String,

    /// Local directory receiving downloaded voice messages
    #[envconfig(default = "/downloads")]
    pub downloads_dir: String,

    /// CSV audit log file
    #[envconfig(default = "log.csv")]
    pub audit_log_path: String,

    /// IANA timezone used for the timestamp appended to echo replies
    #[envconfig(default = "Europe/Paris")]
    pub reply_timezone: String,

    /// Console log level: off, error, warn, info, debug, trace
    #[envconfig(default = "info")]
    pub log_level: String,
}

impl AppConfig {
    /// Checks the values envconfig can't type-check on its own
    pub fn validate(&self) -> Result<(), StartupError> {
        self.timezone()?;
        self.level_filter()?;
        Ok(())
    }

    /// Timezone used to render the local time in echo replies
    pub fn timezone(&self) -> Result<Tz, StartupError> {
        self.reply_timezone
            .parse::<Tz>()
            .map_err(|_| StartupError::InvalidTimezone(self.reply_timezone.clone()))
    }

    pub fn level_filter(&self) -> Result<LevelFilter, StartupError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| StartupError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn downloads_path(&self) -> PathBuf {
        PathBuf::from(&self.downloads_dir)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required_vars() -> HashMap<String, String> {
        HashMap::from([
            ("WEBHOOK_VERIFY_TOKEN".to_string(), "verify-me".to_string()),
            ("GRAPH_API_TOKEN".to_string(), "graph-token".to_string()),
            (
                "NEXTCLOUD_URL".to_string(),
                "https://cloud.example.com/dav/".to_string(),
            ),
            ("NEXTCLOUD_USERNAME".to_string(), "bot".to_string()),
            ("NEXTCLOUD_PASSWORD".to_string(), "secret".to_string()),
        ])
    }

    /// Config pointing every outbound call at `base_url` (a wiremock server)
    pub(crate) fn test_config(base_url: &str, downloads_dir: &str) -> AppConfig {
        AppConfig {
            webhook_verify_token: "verify-me".to_string(),
            graph_api_token: "graph-token".to_string(),
            port: 3000,
            nextcloud_url: format!("{base_url}/remote.php/dav/files/bot/"),
            nextcloud_username: "bot".to_string(),
            nextcloud_password: "secret".to_string(),
            graph_api_base_url: base_url.to_string(),
            downloads_dir: downloads_dir.to_string(),
            audit_log_path: format!("{downloads_dir}/log.csv"),
            reply_timezone: "Europe/Paris".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_init_from_env_applies_defaults() {
        let config = AppConfig::init_from_hashmap(&required_vars()).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.graph_api_base_url, "https://graph.facebook.com/v18.0");
        assert_eq!(config.downloads_dir, "/downloads");
        assert_eq!(config.audit_log_path, "log.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_init_from_env_missing_required_var() {
        let mut vars = required_vars();
        vars.remove("GRAPH_API_TOKEN");

        assert!(AppConfig::init_from_hashmap(&vars).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let mut vars = required_vars();
        vars.insert("REPLY_TIMEZONE".to_string(), "Mars/Olympus".to_string());
        let config = AppConfig::init_from_hashmap(&vars).unwrap();

        assert!(matches!(
            config.validate(),
            Err(StartupError::InvalidTimezone(tz)) if tz == "Mars/Olympus"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut vars = required_vars();
        vars.insert("LOG_LEVEL".to_string(), "loud".to_string());
        let config = AppConfig::init_from_hashmap(&vars).unwrap();

        assert!(matches!(
            config.validate(),
            Err(StartupError::InvalidLogLevel(_))
        ));
    }
}
