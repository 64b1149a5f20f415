use buddy_platform::{
    AsyncMutex, AsyncMutexGuard, FileStorage, PlatformBridge, PlatformError, SettingsStorage,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::{self, Entry, Settings};
use crate::config::SettingsConfig;
use crate::error::{SettingsError, SettingsResult};

/// Lock shared by every store built through [`SettingsStore::resolve`].
static PROCESS_LOCK: LazyLock<Arc<AsyncMutex>> = LazyLock::new(|| Arc::new(AsyncMutex::new()));

/// File-backed key-value settings with optional expiry.
///
/// The whole map lives in one blob. Every operation loads the blob, and
/// writes rewrite it completely, all while holding the store lock, so two
/// read-modify-write operations never interleave.
pub struct SettingsStore {
    storage: Option<Arc<dyn SettingsStorage>>,
    file_name: String,
    lock: Arc<AsyncMutex>,
    lock_timeout: Duration,
}

impl SettingsStore {
    /// A store over `storage` with a lock of its own. Without storage, loads
    /// are empty and saves fail.
    pub fn new(storage: Option<Arc<dyn SettingsStorage>>, config: &SettingsConfig) -> Self {
        Self {
            storage,
            file_name: config.file_name.clone(),
            lock: Arc::new(AsyncMutex::new()),
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Replaces the store lock, e.g. to share one between stores over the
    /// same blob.
    pub fn with_lock(mut self, lock: Arc<AsyncMutex>) -> Self {
        self.lock = lock;
        self
    }

    /// Picks the platform storage area, falling back to a file next to the
    /// executable (or in `config.fallback_dir`).
    pub fn resolve(bridge: &dyn PlatformBridge, config: &SettingsConfig) -> Self {
        let storage = match bridge.storage_area() {
            Ok(Some(area)) => Some(area),
            Ok(None) => {
                debug!("platform offers no storage area");
                Self::fallback_storage(config)
            }
            Err(e) => {
                warn!(error = %e, "platform storage area unavailable, using file fallback");
                Self::fallback_storage(config)
            }
        };
        match &storage {
            Some(s) => info!(storage = %s.describe(), file = %config.file_name, "settings storage resolved"),
            None => warn!("no settings storage available, settings will not persist"),
        }
        Self::new(storage, config).with_lock(Arc::clone(&PROCESS_LOCK))
    }

    fn fallback_storage(config: &SettingsConfig) -> Option<Arc<dyn SettingsStorage>> {
        let files = match &config.fallback_dir {
            Some(dir) => FileStorage::new(dir.clone()),
            None => match FileStorage::in_executable_dir() {
                Ok(files) => files,
                Err(e) => {
                    warn!(error = %e, "cannot locate a directory for the settings file");
                    return None;
                }
            },
        };
        Some(Arc::new(files))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    async fn acquire(&self) -> SettingsResult<AsyncMutexGuard> {
        self.lock
            .lock_timeout(self.lock_timeout)
            .await
            .map_err(|e| match e {
                PlatformError::LockTimeout { .. } => SettingsError::LockTimeout(self.lock_timeout),
                other => other.into(),
            })
    }

    async fn read_locked(&self, _guard: &AsyncMutexGuard) -> SettingsResult<Settings> {
        let Some(storage) = &self.storage else {
            return Ok(Settings::new());
        };
        let Some(bytes) = storage.read(&self.file_name).await? else {
            return Ok(Settings::new());
        };
        let size = bytes.len();
        let settings = codec::parse_records(&String::from_utf8(bytes)?);
        debug!(bytes = size, entries = settings.len(), "settings loaded");
        Ok(settings)
    }

    async fn write_locked(&self, _guard: &AsyncMutexGuard, settings: &Settings) -> SettingsResult<()> {
        let storage = self.storage.as_ref().ok_or_else(|| {
            PlatformError::StorageUnavailable("no settings storage configured".to_string())
        })?;
        if settings.is_empty() {
            let existed = storage.remove(&self.file_name).await?;
            debug!(existed, "settings emptied, blob removed");
            return Ok(());
        }
        let text = codec::serialize_records(settings);
        storage.write(&self.file_name, text.as_bytes()).await?;
        debug!(bytes = text.len(), entries = settings.len(), "settings saved");
        Ok(())
    }

    /// Reads every raw (still encoded) entry. A missing blob is empty.
    pub async fn load(&self) -> SettingsResult<Settings> {
        let guard = self.acquire().await?;
        self.read_locked(&guard).await
    }

    /// Replaces the whole blob with `settings`.
    pub async fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let guard = self.acquire().await?;
        self.write_locked(&guard, settings).await
    }

    /// Stores `value` under `key`, expiring at `expires_at` if given.
    pub async fn set_user_setting(
        &self,
        key: &str,
        value: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> SettingsResult<()> {
        check_key(key)?;
        let guard = self.acquire().await?;
        let mut settings = self.read_locked(&guard).await?;
        settings.insert(key.to_string(), codec::encode(value, expires_at));
        self.write_locked(&guard, &settings).await
    }

    /// The live value under `key`. Expired or malformed entries read as
    /// absent and are deleted.
    pub async fn get_user_setting(&self, key: &str) -> SettingsResult<Option<String>> {
        self.get_user_setting_at(key, Utc::now()).await
    }

    /// [`get_user_setting`](Self::get_user_setting) against an explicit clock.
    pub async fn get_user_setting_at(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> SettingsResult<Option<String>> {
        check_key(key)?;
        let guard = self.acquire().await?;
        let mut settings = self.read_locked(&guard).await?;
        let Some(raw) = settings.get(key) else {
            return Ok(None);
        };
        let reason = match codec::classify(raw, now) {
            Entry::Live(value) => return Ok(Some(value.to_string())),
            Entry::Expired => "expired",
            Entry::Corrupt => "malformed",
        };
        warn!(key = %key, reason, "purging settings entry");
        settings.remove(key);
        self.write_locked(&guard, &settings).await?;
        Ok(None)
    }

    /// Removes `key`. Returns whether it was present; the blob is only
    /// rewritten when it was.
    pub async fn clear_user_setting(&self, key: &str) -> SettingsResult<bool> {
        check_key(key)?;
        let guard = self.acquire().await?;
        let mut settings = self.read_locked(&guard).await?;
        if settings.remove(key).is_none() {
            return Ok(false);
        }
        self.write_locked(&guard, &settings).await?;
        Ok(true)
    }
}

fn check_key(key: &str) -> SettingsResult<()> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("storage", &self.storage.as_ref().map(|s| s.describe()))
            .field("file_name", &self.file_name)
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}
