//! Connection settings.
//!
//! ```
//! use std::time::Duration;
//! use hat_juggler::Settings;
//!
//! let settings = Settings::from_toml_str("sync_delay = 250\naddress = \"ws://10.0.0.1:23023/ws\"").unwrap();
//! assert_eq!(settings.sync_delay, Duration::from_millis(250));
//! assert_eq!(settings.retry_delay, Duration::from_millis(5000));
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::JugglerError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Debounce window for outbound local changes, in milliseconds.
    #[serde(deserialize_with = "millis")]
    pub sync_delay: Duration,
    /// Wait after a close before the next connection attempt, in
    /// milliseconds.
    #[serde(deserialize_with = "millis")]
    pub retry_delay: Duration,
    /// Explicit endpoint. Derived from the page URL when absent.
    pub address: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_delay: Duration::from_millis(100),
            retry_delay: Duration::from_millis(5000),
            address: None,
        }
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, JugglerError> {
        toml::from_str(text).map_err(|e| JugglerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, JugglerError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| JugglerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
