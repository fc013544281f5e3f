//! # Memory store
//!
//! Preference store living in memory, for hosts that persist
//! preferences on their own and for tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::{Error, Result};

use super::PreferenceStore;

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore(Mutex<HashMap<String, Value>>);

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>> {
        self.0
            .lock()
            .map_err(|err| Error::LockPreferenceStoreError(err.to_string()))
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = self.lock()?.get(key).cloned();
        trace!(key, ?value, "read preference from memory");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        trace!(key, ?value, "write preference to memory");
        self.lock()?.insert(key.to_owned(), value);
        Ok(())
    }
}
