//! Receiver configuration, loadable from a JSON file.
//!
//! ```json
//! { "chunk_size": 32, "max_reads_per_packet": 64 }
//! ```
//!
//! Missing fields fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{LOG_THROTTLE_CAP, LOG_THROTTLE_WINDOW_MS};
use crate::error::{Result, WMBusError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiverConfig {
    /// Bytes delivered per simulated FIFO read
    pub chunk_size: usize,
    /// Reads after which a packet that never completes is dropped
    pub max_reads_per_packet: usize,
    /// Drop warning throttle window
    pub log_window_ms: u64,
    /// Drop warnings allowed per window
    pub log_cap: u32,
    /// Warn about frames no handler marked as handled
    pub warn_unhandled: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            max_reads_per_packet: 64,
            log_window_ms: LOG_THROTTLE_WINDOW_MS,
            log_cap: LOG_THROTTLE_CAP,
            warn_unhandled: true,
        }
    }
}

impl ReceiverConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(WMBusError::Other("chunk_size must be at least 1".into()));
        }
        if self.max_reads_per_packet == 0 {
            return Err(WMBusError::Other(
                "max_reads_per_packet must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ReceiverConfig::from_json(r#"{ "chunk_size": 4 }"#).unwrap();
        assert_eq!(config.chunk_size, 4);
        assert_eq!(config.max_reads_per_packet, 64);
        assert!(config.warn_unhandled);
    }

    #[test]
    fn test_throttle_defaults_are_shared() {
        let config = ReceiverConfig::default();
        assert_eq!(config.log_window_ms, LOG_THROTTLE_WINDOW_MS);
        assert_eq!(config.log_cap, LOG_THROTTLE_CAP);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = ReceiverConfig::from_json(r#"{ "chunk": 4 }"#).unwrap_err();
        assert!(matches!(err, WMBusError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_chunk() {
        assert!(ReceiverConfig::from_json(r#"{ "chunk_size": 0 }"#).is_err());
    }
}
