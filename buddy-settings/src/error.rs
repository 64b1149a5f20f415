//! Error types for the settings store.

use buddy_platform::PlatformError;
use std::time::Duration;
use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors that can occur reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The store lock was not acquired within the configured bound.
    #[error("settings lock not acquired within {0:?}")]
    LockTimeout(Duration),

    /// Keys must be non-empty.
    #[error("invalid settings key: {0:?}")]
    InvalidKey(String),

    /// Storage failure.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// The persisted blob is not UTF-8.
    #[error("settings blob is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
