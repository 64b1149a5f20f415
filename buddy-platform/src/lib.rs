//! Platform abstraction layer for the Buddy SDK core.
//!
//! The core never talks to a UI toolkit or an OS storage API directly. It
//! consumes:
//! - [`PlatformBridge`] — UI-thread dispatch, configuration lookup and the
//!   platform's preferred storage area
//! - [`SettingsStorage`] — raw named-blob storage backing the settings store
//!
//! and ships the primitives every platform shares:
//! - [`AsyncMutex`] — exclusive access for async callers, with a scoped guard
//! - [`ThreadAffinity`] — "am I on the thread I was created on?"
//! - [`FileStorage`] / [`MemoryStorage`] — storage fallbacks

pub mod bridge;
mod error;
pub mod lock;
pub mod storage;

pub use bridge::{PlatformBridge, ThreadAffinity, UiAction};
pub use error::{PlatformError, PlatformResult};
pub use lock::{AsyncMutex, AsyncMutexGuard};
pub use storage::{FileStorage, MemoryStorage, SettingsStorage};
