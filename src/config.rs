//! Parser settings loaded from a TOML file.
//!
//! The file is optional; a missing file yields `ParserConfig::default()`.
//! Unknown keys are accepted by serde and logged as likely typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::parser::AuthCredentials;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// The HTTP client could not be built from the settings.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings for [`crate::Parser`].
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// ```toml
/// user_agent = "my-app/2.1"
/// timeout_secs = 10
///
/// [credentials]
/// username = "user1"
/// password = "password1"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Sent as the `User-Agent` header.
    pub user_agent: String,

    /// Whole-request timeout in seconds. 0 = no timeout.
    pub timeout_secs: u64,

    /// Largest response body accepted, in bytes.
    pub max_feed_bytes: usize,

    /// HTTP Basic credentials, sent only when both parts are non-empty.
    pub credentials: Option<AuthCredentials>,
}

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("podfeed/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default response size limit (10 MB).
pub const DEFAULT_MAX_FEED_BYTES: usize = 10 * 1024 * 1024;

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_feed_bytes: DEFAULT_MAX_FEED_BYTES,
            credentials: None,
        }
    }
}

impl ParserConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] =
        ["user_agent", "timeout_secs", "max_feed_bytes", "credentials"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(ParserConfig::default())`
    /// - Empty file → `Ok(ParserConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text. Blank text yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: ParserConfig = toml::from_str(content)?;
        tracing::debug!(
            user_agent = %config.user_agent,
            timeout_secs = config.timeout_secs,
            has_credentials = config.credentials.is_some(),
            "Loaded parser configuration"
        );
        Ok(config)
    }

    /// The request timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("podfeed_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert!(config.user_agent.starts_with("podfeed/"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_feed_bytes, 10 * 1024 * 1024);
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/podfeed_test_nonexistent_config.toml");
        let config = ParserConfig::load(path).unwrap();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = ParserConfig::load(&path).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let path = write_config(
            "full",
            r#"
user_agent = "my-app/2.1"
timeout_secs = 0
max_feed_bytes = 4096

[credentials]
username = "user1"
password = "password1"
"#,
        );

        let config = ParserConfig::load(&path).unwrap();
        assert_eq!(config.user_agent, "my-app/2.1");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.max_feed_bytes, 4096);
        let credentials = config.credentials.as_ref().unwrap();
        assert_eq!(credentials.username, "user1");
        assert_eq!(credentials.password.expose_secret(), "password1");

        cleanup(&path);
    }

    #[test]
    fn test_partial_credentials_default_missing_part() {
        let config = ParserConfig::from_toml("[credentials]\nusername = \"user1\"\n").unwrap();
        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.username, "user1");
        assert_eq!(credentials.password.expose_secret(), "");
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = ParserConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let err = ParserConfig::from_toml("timeout_secs = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config =
            ParserConfig::from_toml("user_agent = \"x\"\ntotally_fake_key = 42\n").unwrap();
        assert_eq!(config.user_agent, "x");
    }

    // File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = ParserConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    // Debug output masks the password
    #[test]
    fn test_debug_masks_password() {
        let config = ParserConfig::from_toml(
            "[credentials]\nusername = \"user1\"\npassword = \"super-secret-12345\"\n",
        )
        .unwrap();
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-12345"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("user1"));
    }
}
