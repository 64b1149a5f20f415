//! Local settings for the Buddy SDK.
//!
//! [`SettingsStore`] persists a flat map of small named values (tokens,
//! flags) in a single blob, optionally with an expiry instant. The blob is
//! found through the host's [`PlatformBridge`](buddy_platform::PlatformBridge)
//! or, failing that, in a file named by [`SettingsConfig::file_name`].
//!
//! Every load and save runs under one [`AsyncMutex`](buddy_platform::AsyncMutex)
//! with a bounded wait; a compound operation such as
//! [`SettingsStore::set_user_setting`] holds it for its whole
//! read-modify-write.

pub mod codec;
mod config;
mod error;
mod push;
mod store;

pub use codec::{Entry, Settings};
pub use config::SettingsConfig;
pub use error::{SettingsError, SettingsResult};
pub use push::{PUSH_TOKEN_KEY, PushTokenStore};
pub use store::SettingsStore;
