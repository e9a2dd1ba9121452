//! Media server connection configuration

use crate::{get_env_or_default, parse_env, ConfigError, ConfigResult};

/// Path of the JSON-RPC endpoint on the media server
const JSONRPC_PATH: &str = "jsonrpc.js";

/// Media server (LMS) connection configuration
#[derive(Debug, Clone)]
pub struct LmsConfig {
    /// Server base URL (e.g., http://localhost:9000)
    pub url: String,

    /// Player MAC/identifier used for player-scoped commands
    pub player_id: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retry attempts for idempotent queries
    pub max_retries: u32,
}

impl LmsConfig {
    /// Load media server configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let url = get_env_or_default("LMS_URL", "http://localhost:9000");
        validate_url("LMS_URL", &url)?;

        Ok(Self {
            url,
            player_id: std::env::var("LMS_PLAYER_ID")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            timeout_secs: parse_env("LMS_TIMEOUT", 10)?,
            max_retries: parse_env("LMS_MAX_RETRIES", 3)?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the player identifier
    pub fn with_player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    /// Server base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Get the full URL for the JSON-RPC endpoint
    pub fn jsonrpc_url(&self) -> String {
        format!("{}/{}", self.base_url(), JSONRPC_PATH)
    }

    /// Get the player identifier, failing when none is configured
    pub fn require_player(&self) -> ConfigResult<&str> {
        self.player_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("LMS_PLAYER_ID".to_string()))
    }
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9000".to_string(),
            player_id: None,
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

fn validate_url(name: &str, value: &str) -> ConfigResult<()> {
    let parsed =
        url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl(
            name.to_string(),
            format!("unsupported scheme '{}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = LmsConfig::default();
        assert_eq!(config.url, "http://localhost:9000");
        assert!(config.player_id.is_none());
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_jsonrpc_url() {
        let config = LmsConfig::with_url("http://lms:9000");
        assert_eq!(config.jsonrpc_url(), "http://lms:9000/jsonrpc.js");
    }

    #[test]
    fn test_jsonrpc_url_with_trailing_slash() {
        let config = LmsConfig::with_url("http://lms:9000/");
        assert_eq!(config.jsonrpc_url(), "http://lms:9000/jsonrpc.js");
    }

    #[test]
    fn test_from_env_reads_player() {
        temp_env::with_vars(
            [
                ("LMS_URL", Some("http://music.local:9000")),
                ("LMS_PLAYER_ID", Some(" 00:11:22:33:44:55 ")),
                ("LMS_TIMEOUT", None),
            ],
            || {
                let config = LmsConfig::from_env().unwrap();
                assert_eq!(config.url, "http://music.local:9000");
                assert_eq!(config.player_id.as_deref(), Some("00:11:22:33:44:55"));
                assert_eq!(config.timeout_secs, 10);
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_url() {
        temp_env::with_var("LMS_URL", Some("not a url"), || {
            assert_matches!(LmsConfig::from_env(), Err(ConfigError::InvalidUrl(name, _)) if name == "LMS_URL");
        });
        temp_env::with_var("LMS_URL", Some("ftp://lms:9000"), || {
            assert_matches!(LmsConfig::from_env(), Err(ConfigError::InvalidUrl(_, _)));
        });
    }

    #[test]
    fn test_require_player() {
        let config = LmsConfig::default();
        assert_matches!(config.require_player(), Err(ConfigError::MissingEnvVar(_)));

        let config = config.with_player("aa:bb");
        assert_eq!(config.require_player().unwrap(), "aa:bb");
    }
}
