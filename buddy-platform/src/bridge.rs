//! The platform bridge: what the core needs from its host.
//!
//! Every supported platform (phone, desktop, store app, headless service)
//! provides one implementation. The core only calls it; device metadata,
//! connectivity and push transport stay on the platform side.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use crate::error::PlatformResult;
use crate::storage::SettingsStorage;

/// A callback marshalled onto the UI thread.
pub type UiAction = Box<dyn FnOnce() + Send + 'static>;

/// Host services consumed by the SDK core.
pub trait PlatformBridge: Send + Sync {
    /// Returns true when called on the UI thread of record.
    fn is_ui_thread(&self) -> bool;

    /// Queues `action` onto the UI thread. Only called from other threads.
    fn invoke_on_ui_thread_core(&self, action: UiAction);

    /// Runs `action` on the UI thread: inline if already there, queued otherwise.
    fn invoke_on_ui_thread(&self, action: UiAction) {
        if self.is_ui_thread() {
            action();
        } else {
            self.invoke_on_ui_thread_core(action);
        }
    }

    /// Looks up an application configuration value.
    fn get_config_setting(&self, key: &str) -> Option<String> {
        let _ = key;
        None
    }

    /// Returns the platform's preferred storage area for settings.
    ///
    /// `Ok(None)` and `Err(_)` both make the settings store fall back to a
    /// file next to the executable.
    fn storage_area(&self) -> PlatformResult<Option<Arc<dyn SettingsStorage>>> {
        Ok(None)
    }
}

/// Remembers the thread it was created on.
///
/// Bridge implementations construct one on their UI thread and answer
/// [`PlatformBridge::is_ui_thread`] with [`ThreadAffinity::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Captures the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Returns true when called on the captured thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }
}
