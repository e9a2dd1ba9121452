//! Monitor configuration loaded from environment variables
//!
//! Everything except the poll interval comes from the shared configuration,
//! so the monitor reads `LMS_*` and `QUEUE_*` variables exactly like the
//! library crates do.

use std::time::Duration;

use anyhow::{Context, Result};
use lms_remote_shared_config::{parse_env, CommonConfig, Environment, LmsConfig, QueueConfig};

/// Default status poll interval in milliseconds
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// How often the player status is polled for queue changes
    pub poll_interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env().context("Failed to load config")?;

        let poll_interval_ms = parse_env("MONITOR_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)
            .context("Invalid MONITOR_POLL_INTERVAL_MS value")?;
        if poll_interval_ms == 0 {
            anyhow::bail!("MONITOR_POLL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            common,
            poll_interval_ms,
        })
    }

    pub fn lms(&self) -> &LmsConfig {
        &self.common.lms
    }

    pub fn queue(&self) -> &QueueConfig {
        &self.common.queue
    }

    /// Player to monitor; required for this binary
    pub fn player_id(&self) -> Result<&str> {
        self.common
            .lms
            .require_player()
            .context("LMS_PLAYER_ID must name the player to monitor")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn environment(&self) -> Environment {
        self.common.environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("LMS_URL", Some("http://lms.local:9000")),
                ("LMS_PLAYER_ID", Some("aa:bb:cc:dd:ee:ff")),
                ("MONITOR_POLL_INTERVAL_MS", None),
                ("QUEUE_PAGE_SIZE", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.poll_interval(), Duration::from_secs(1));
                assert_eq!(config.player_id().unwrap(), "aa:bb:cc:dd:ee:ff");
                assert_eq!(config.queue().page_size, 100);
                assert_eq!(config.lms().base_url(), "http://lms.local:9000");
            },
        );
    }

    #[test]
    fn test_custom_poll_interval() {
        temp_env::with_vars([("MONITOR_POLL_INTERVAL_MS", Some("250"))], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.poll_interval_ms, 250);
        });
    }

    #[test]
    fn test_invalid_poll_interval() {
        temp_env::with_vars([("MONITOR_POLL_INTERVAL_MS", Some("soon"))], || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("MONITOR_POLL_INTERVAL_MS"));
        });

        temp_env::with_vars([("MONITOR_POLL_INTERVAL_MS", Some("0"))], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_player_required() {
        temp_env::with_vars([("LMS_PLAYER_ID", None::<&str>)], || {
            let config = Config::from_env().unwrap();
            assert!(config.player_id().is_err());
        });
    }
}
