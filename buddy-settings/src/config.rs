use buddy_platform::PlatformBridge;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Settings store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Name of the blob holding every setting.
    pub file_name: String,
    /// Directory for the file fallback. Defaults to the executable's directory.
    pub fallback_dir: Option<PathBuf>,
    /// Upper bound on waiting for the store lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            file_name: "_buddy".to_string(),
            fallback_dir: None,
            lock_timeout_ms: 10_000,
        }
    }
}

impl SettingsConfig {
    /// Host setting overriding [`file_name`](Self::file_name).
    pub const FILE_NAME_KEY: &'static str = "Buddy.Settings.FileName";
    /// Host setting overriding [`lock_timeout_ms`](Self::lock_timeout_ms).
    pub const LOCK_TIMEOUT_KEY: &'static str = "Buddy.Settings.LockTimeoutMs";

    /// Defaults, overridden by whatever the host supplies.
    pub fn from_bridge(bridge: &dyn PlatformBridge) -> Self {
        let mut config = Self::default();
        if let Some(name) = bridge.get_config_setting(Self::FILE_NAME_KEY) {
            let name = name.trim();
            if name.is_empty() {
                warn!(key = Self::FILE_NAME_KEY, "empty settings file name, keeping default");
            } else {
                config.file_name = name.to_string();
            }
        }
        if let Some(raw) = bridge.get_config_setting(Self::LOCK_TIMEOUT_KEY) {
            match raw.trim().parse() {
                Ok(ms) => config.lock_timeout_ms = ms,
                Err(e) => warn!(
                    key = Self::LOCK_TIMEOUT_KEY,
                    value = %raw,
                    error = %e,
                    "unparsable lock timeout, keeping default"
                ),
            }
        }
        config
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
