//! Cached device push token.

use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::info;

use crate::error::SettingsResult;
use crate::store::SettingsStore;

/// Settings key holding the push token.
pub const PUSH_TOKEN_KEY: &str = "__PushToken";

#[derive(Debug, Default)]
struct Cached {
    loaded: bool,
    token: Option<String>,
}

/// The device push token, persisted in the settings store and read from it
/// at most once.
///
/// The token itself is opaque; [`subscribe`](Self::subscribe) lets a
/// transport re-register when it changes.
#[derive(Debug)]
pub struct PushTokenStore {
    settings: Arc<SettingsStore>,
    cache: Mutex<Cached>,
    changes: watch::Sender<Option<String>>,
}

impl PushTokenStore {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            settings,
            cache: Mutex::new(Cached::default()),
            changes,
        }
    }

    async fn ensure_loaded(&self, cache: &mut Cached) -> SettingsResult<()> {
        if !cache.loaded {
            cache.token = self.settings.get_user_setting(PUSH_TOKEN_KEY).await?;
            cache.loaded = true;
            self.changes.send_replace(cache.token.clone());
        }
        Ok(())
    }

    /// The stored token, if any.
    pub async fn get_push_token(&self) -> SettingsResult<Option<String>> {
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await?;
        Ok(cache.token.clone())
    }

    /// Persists `token` and notifies subscribers. Empty tokens and the
    /// current token are ignored. Returns whether anything changed.
    pub async fn set_push_token(&self, token: &str) -> SettingsResult<bool> {
        if token.is_empty() {
            return Ok(false);
        }
        let mut cache = self.cache.lock().await;
        self.ensure_loaded(&mut cache).await?;
        if cache.token.as_deref() == Some(token) {
            return Ok(false);
        }

        self.settings
            .set_user_setting(PUSH_TOKEN_KEY, token, None)
            .await?;
        cache.token = Some(token.to_string());
        self.changes.send_replace(cache.token.clone());
        info!("push token changed");
        Ok(true)
    }

    /// Observes the token. The receiver sees `None` until the token is
    /// first loaded or set.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.changes.subscribe()
    }
}
