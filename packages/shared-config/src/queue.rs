//! Play queue synchronizer tuning

use std::time::Duration;

use crate::{parse_env, ConfigError, ConfigResult};

/// Play queue synchronizer configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Items requested per incremental page
    pub page_size: usize,

    /// Minimum number of items requested by a full reload
    pub reload_min: usize,

    /// Debounce window for change notifications in milliseconds
    pub debounce_ms: u64,

    /// Distance from the bottom (in pixels) that triggers the next page
    pub near_bottom_px: f64,

    /// Scroll to the current track whenever it changes
    pub auto_scroll: bool,
}

impl QueueConfig {
    /// Load queue configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            page_size: parse_env("QUEUE_PAGE_SIZE", 100)?,
            reload_min: parse_env("QUEUE_RELOAD_MIN", 50)?,
            debounce_ms: parse_env("QUEUE_DEBOUNCE_MS", 50)?,
            near_bottom_px: parse_env("QUEUE_NEAR_BOTTOM_PX", 300.0)?,
            auto_scroll: parse_env("QUEUE_AUTO_SCROLL", false)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall paging
    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "QUEUE_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.reload_min == 0 {
            return Err(ConfigError::ValidationError(
                "QUEUE_RELOAD_MIN must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Debounce window as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            reload_min: 50,
            debounce_ms: 50,
            near_bottom_px: 300.0,
            auto_scroll: false,
        }
    }
}
