//! Error types for the platform layer.

use thiserror::Error;

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors that can occur in platform operations.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The platform's storage area exists but cannot be used right now.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// An [`AsyncMutex`](crate::AsyncMutex) was not acquired in time.
    #[error("lock not acquired within {waited_ms} ms")]
    LockTimeout { waited_ms: u64 },
}
