//! Configuration for the linking service
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default capacity of the link event broadcast channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Rejected configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid linking configuration: {0}")]
    Invalid(String),
}

/// Configuration for `LinkingService`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Capacity of the broadcast channel carrying `LinkEvent`s
    ///
    /// Slow subscribers that fall further behind than this lose the oldest
    /// events (tokio broadcast semantics); linking calls never block on them.
    pub event_channel_capacity: usize,

    /// Emit a `LinkEvent` after each persisted change
    pub emit_events: bool,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            emit_events: true,
        }
    }
}

impl LinkingConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkingConfig::default();
        assert_eq!(config.event_channel_capacity, 128);
        assert!(config.emit_events);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = LinkingConfig {
            event_channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LinkingConfig = serde_json::from_str(r#"{"emit_events": false}"#).unwrap();
        assert!(!config.emit_events);
        assert_eq!(config.event_channel_capacity, DEFAULT_EVENT_CHANNEL_CAPACITY);
    }
}
