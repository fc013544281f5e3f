use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// The persisted key-value store.
///
/// Keys live in a flat namespace. Values are JSON values, typing is
/// the job of the [`PreferenceAdapter`](super::PreferenceAdapter).
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get the value stored at the given key.
    ///
    /// Returns `None` when nothing has been stored yet.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// (Re)set the value stored at the given key.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}
