//! # File store
//!
//! Preference store persisting all keys in one JSON object file. The
//! file is read on every access and rewritten on every change, using
//! a temporary file then a rename so that a crash never leaves a
//! truncated file behind.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};
use tracing::{debug, trace};

use crate::{Error, Result};

use super::PreferenceStore;

#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "preferences file not found, using empty store");
                return Ok(Map::new());
            }
            Err(err) => return Err(Error::ReadPreferencesFileError(err, self.path.clone())),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        serde_json::from_slice(&contents)
            .map_err(|err| Error::ParsePreferencesFileError(err, self.path.clone()))
    }

    async fn write(&self, entries: &Map<String, Value>) -> Result<()> {
        let contents = serde_json::to_vec_pretty(entries)
            .map_err(|err| Error::SerializePreferenceError(err, self.path.display().to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| Error::WritePreferencesFileError(err, parent.to_owned()))?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|err| Error::WritePreferencesFileError(err, tmp.clone()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| Error::WritePreferencesFileError(err, self.path.clone()))
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        let value = self.read().await?.remove(key);
        trace!(key, ?value, "read preference from file");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        trace!(key, ?value, "write preference to file");
        let mut entries = self.read().await?;
        entries.insert(key.to_owned(), value);
        self.write(&entries).await
    }
}
