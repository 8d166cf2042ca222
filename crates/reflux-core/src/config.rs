//! Store configuration
//!
//! Controls history recording and reset behaviour. Configurations can be
//! built in code or loaded from RON:
//!
//! ```
//! use reflux_core::StoreConfig;
//!
//! let config = StoreConfig::from_ron("(history_limit: 50)").unwrap();
//! assert_eq!(config.history_limit, 50);
//! assert!(config.record_history);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Store`](crate::Store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Record a snapshot after every dispatch (needed for undo/redo/jump)
    pub record_history: bool,
    /// Maximum number of snapshots to keep (0 = unlimited)
    ///
    /// When the limit is hit the oldest snapshots are dropped, so undo can
    /// no longer reach the initial state.
    pub history_limit: usize,
    /// Whether `reset()` also tears down every registered effect
    pub reset_unregisters_effects: bool,
}

impl StoreConfig {
    /// Parse a configuration from RON. Missing fields take their defaults.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    /// Configuration that keeps no history at all
    pub fn without_history() -> Self {
        Self {
            record_history: false,
            ..Default::default()
        }
    }

    /// Set the snapshot limit
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            record_history: true,
            history_limit: 0,
            reset_unregisters_effects: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.record_history);
        assert_eq!(config.history_limit, 0);
        assert!(config.reset_unregisters_effects);
    }

    #[test]
    fn test_from_ron_partial() {
        let config = StoreConfig::from_ron("(record_history: false)").unwrap();
        assert!(!config.record_history);
        assert!(config.reset_unregisters_effects);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = StoreConfig::default().with_history_limit(16);
        let text = ron::to_string(&config).unwrap();
        assert_eq!(StoreConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_from_ron_invalid() {
        let err = StoreConfig::from_ron("(history_limit: \"many\")").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
