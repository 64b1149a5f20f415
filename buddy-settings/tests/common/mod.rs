//! Shared fixtures for settings tests.

#![allow(dead_code)]

use async_trait::async_trait;
use buddy_platform::{
    MemoryStorage, PlatformBridge, PlatformError, PlatformResult, SettingsStorage, UiAction,
};
use buddy_settings::{SettingsConfig, SettingsStore};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Routes store logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A store over fresh in-memory storage, plus a handle to that storage.
pub fn memory_store() -> (SettingsStore, Arc<MemoryStorage>) {
    init_tracing();
    let storage = Arc::new(MemoryStorage::new());
    let store = SettingsStore::new(
        Some(storage.clone() as Arc<dyn SettingsStorage>),
        &SettingsConfig::default(),
    );
    (store, storage)
}

/// Storage whose every operation fails.
pub struct BrokenStorage;

#[async_trait]
impl SettingsStorage for BrokenStorage {
    fn describe(&self) -> String {
        "broken storage".to_string()
    }

    async fn read(&self, _name: &str) -> PlatformResult<Option<Vec<u8>>> {
        Err(PlatformError::StorageUnavailable("disk gone".to_string()))
    }

    async fn write(&self, _name: &str, _contents: &[u8]) -> PlatformResult<()> {
        Err(PlatformError::StorageUnavailable("disk gone".to_string()))
    }

    async fn remove(&self, _name: &str) -> PlatformResult<bool> {
        Err(PlatformError::StorageUnavailable("disk gone".to_string()))
    }
}

/// What a [`HostBridge`] answers for its storage area.
pub enum Area {
    Provided(Arc<dyn SettingsStorage>),
    Missing,
    Failing,
}

/// A host that runs everything inline and answers config lookups from a map.
pub struct HostBridge {
    pub area: Area,
    pub config: HashMap<&'static str, &'static str>,
}

impl HostBridge {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            config: HashMap::new(),
        }
    }
}

impl PlatformBridge for HostBridge {
    fn is_ui_thread(&self) -> bool {
        true
    }

    fn invoke_on_ui_thread_core(&self, action: UiAction) {
        action();
    }

    fn get_config_setting(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.to_string())
    }

    fn storage_area(&self) -> PlatformResult<Option<Arc<dyn SettingsStorage>>> {
        match &self.area {
            Area::Provided(storage) => Ok(Some(Arc::clone(storage))),
            Area::Missing => Ok(None),
            Area::Failing => Err(PlatformError::StorageUnavailable("sandboxed".to_string())),
        }
    }
}
