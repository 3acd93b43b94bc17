use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_DEBOUNCE_MS;

/// Tunables for a search-and-select field.
///
/// Deserializes from any serde source; missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    /// Quiet period after the last keystroke before a search is dispatched.
    pub debounce_ms: u64,
}

impl SelectorConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_debounce() {
        assert_eq!(SelectorConfig::default().debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SelectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SelectorConfig::default());

        let config: SelectorConfig = serde_json::from_str(r#"{"debounce_ms": 250}"#).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result: Result<SelectorConfig, _> = serde_json::from_str(r#"{"debounce": 250}"#);
        assert!(result.is_err());
    }
}
