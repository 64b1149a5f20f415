//! Raw named-blob storage backing the settings store.
//!
//! A storage holds whole blobs addressed by name. Writes replace the blob
//! entirely and leave it exactly as long as the new contents.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::PlatformResult;

/// Abstract blob storage.
#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Reads a whole blob. A missing blob is `Ok(None)`, not an error.
    async fn read(&self, name: &str) -> PlatformResult<Option<Vec<u8>>>;

    /// Replaces a blob, creating it if needed and truncating any excess.
    async fn write(&self, name: &str, contents: &[u8]) -> PlatformResult<()>;

    /// Deletes a blob. Returns whether it existed.
    async fn remove(&self, name: &str) -> PlatformResult<bool>;
}

/// Blobs as files in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Stores blobs under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stores blobs next to the running executable, or in the working
    /// directory when the executable path cannot be determined.
    pub fn in_executable_dir() -> PlatformResult<Self> {
        let dir = match std::env::current_exe() {
            Ok(exe) => match exe.parent() {
                Some(parent) => parent.to_path_buf(),
                None => std::env::current_dir()?,
            },
            Err(e) => {
                debug!(error = %e, "executable path unavailable, using working directory");
                std::env::current_dir()?
            }
        };
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file holding `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[async_trait]
impl SettingsStorage for FileStorage {
    fn describe(&self) -> String {
        format!("file storage at {}", self.dir.display())
    }

    async fn read(&self, name: &str) -> PlatformResult<Option<Vec<u8>>> {
        match fs::read(self.path_of(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, contents: &[u8]) -> PlatformResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.path_of(name))
            .await?;
        file.write_all(contents).await?;
        file.set_len(contents.len() as u64).await?;
        file.flush().await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> PlatformResult<bool> {
        match fs::remove_file(self.path_of(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Blobs in process memory. Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStorage for MemoryStorage {
    fn describe(&self) -> String {
        "in-memory storage".to_string()
    }

    async fn read(&self, name: &str) -> PlatformResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(name).cloned())
    }

    async fn write(&self, name: &str, contents: &[u8]) -> PlatformResult<()> {
        self.blobs
            .write()
            .await
            .insert(name.to_string(), contents.to_vec());
        Ok(())
    }

    async fn remove(&self, name: &str) -> PlatformResult<bool> {
        Ok(self.blobs.write().await.remove(name).is_some())
    }
}
