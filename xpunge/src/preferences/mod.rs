//! # Preferences
//!
//! Module dedicated to user preferences. The [`Preferences`] struct
//! gathers every setting with its default value, the
//! [`PreferenceAdapter`] reads and writes them from a
//! [`PreferenceStore`].
//!
//! Folder lists are self-healing: references to folders that do not
//! exist anymore are dropped, both when reading and when writing.

#[cfg(feature = "tokio")]
pub mod file;
pub mod memory;
mod store;

use std::{fmt, sync::Arc};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{backend::MailboxBackend, folder::FolderRef, Error, Result};

#[cfg(feature = "tokio")]
#[doc(inline)]
pub use self::file::FilePreferenceStore;
#[doc(inline)]
pub use self::{memory::MemoryPreferenceStore, store::PreferenceStore};

/// The preference key enumeration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PreferenceKey {
    EmptyTrash,
    EmptyJunk,
    CompactFolders,
    MultiTrashAccounts,
    MultiJunkAccounts,
    MultiCompactFolders,
    TimerTrashAccounts,
    TimerJunkAccounts,
    TimerCompactFolders,
    TimerIntervalEnabled,
    TimerIntervalStartup,
    TimerIntervalLoop,
    TimerAbsoluteEnabled,
    TimerAbsolute,
    ConfirmSingleAction,
    ConfirmMultiAction,
}

/// The kind of value a preference holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PreferenceKind {
    Bool,
    Text,
    Folders,
}

impl PreferenceKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Text => "text",
            Self::Folders => "folder list",
        }
    }
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 16] = [
        Self::EmptyTrash,
        Self::EmptyJunk,
        Self::CompactFolders,
        Self::MultiTrashAccounts,
        Self::MultiJunkAccounts,
        Self::MultiCompactFolders,
        Self::TimerTrashAccounts,
        Self::TimerJunkAccounts,
        Self::TimerCompactFolders,
        Self::TimerIntervalEnabled,
        Self::TimerIntervalStartup,
        Self::TimerIntervalLoop,
        Self::TimerAbsoluteEnabled,
        Self::TimerAbsolute,
        Self::ConfirmSingleAction,
        Self::ConfirmMultiAction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::EmptyTrash => "empty_trash",
            Self::EmptyJunk => "empty_junk",
            Self::CompactFolders => "compact_folders",
            Self::MultiTrashAccounts => "multi_trash_accounts",
            Self::MultiJunkAccounts => "multi_junk_accounts",
            Self::MultiCompactFolders => "multi_compact_folders",
            Self::TimerTrashAccounts => "timer_trash_accounts",
            Self::TimerJunkAccounts => "timer_junk_accounts",
            Self::TimerCompactFolders => "timer_compact_folders",
            Self::TimerIntervalEnabled => "timer_interval_enabled",
            Self::TimerIntervalStartup => "timer_interval_startup",
            Self::TimerIntervalLoop => "timer_interval_loop",
            Self::TimerAbsoluteEnabled => "timer_absolute_enabled",
            Self::TimerAbsolute => "timer_absolute",
            Self::ConfirmSingleAction => "confirm_single_action",
            Self::ConfirmMultiAction => "confirm_multi_action",
        }
    }

    /// Return the key under which the preference is persisted.
    pub fn storage_key(&self) -> String {
        format!("preferences_{}", self.name())
    }

    pub fn kind(&self) -> PreferenceKind {
        match self {
            Self::MultiTrashAccounts
            | Self::MultiJunkAccounts
            | Self::MultiCompactFolders
            | Self::TimerTrashAccounts
            | Self::TimerJunkAccounts
            | Self::TimerCompactFolders => PreferenceKind::Folders,
            Self::TimerIntervalStartup | Self::TimerIntervalLoop | Self::TimerAbsolute => {
                PreferenceKind::Text
            }
            _ => PreferenceKind::Bool,
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The typed preference value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PreferenceValue {
    Bool(bool),
    Text(String),
    Folders(Vec<FolderRef>),
}

impl PreferenceValue {
    pub fn kind(&self) -> PreferenceKind {
        match self {
            Self::Bool(_) => PreferenceKind::Bool,
            Self::Text(_) => PreferenceKind::Text,
            Self::Folders(_) => PreferenceKind::Folders,
        }
    }

    fn decode(kind: PreferenceKind, value: Value) -> Option<Self> {
        match (kind, value) {
            (PreferenceKind::Bool, Value::Bool(b)) => Some(Self::Bool(b)),
            (PreferenceKind::Text, Value::String(s)) => Some(Self::Text(s)),
            // numbers are accepted for numeric text preferences
            (PreferenceKind::Text, Value::Number(n)) => Some(Self::Text(n.to_string())),
            // an empty string is how a never-edited list used to be stored
            (PreferenceKind::Folders, Value::String(s)) if s.is_empty() => {
                Some(Self::Folders(Vec::new()))
            }
            _ => None,
        }
    }

    fn encode(&self, key: PreferenceKey) -> Result<Value> {
        match self {
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Text(s) => Ok(Value::String(s.clone())),
            Self::Folders(folders) => serde_json::to_value(folders)
                .map_err(|err| Error::SerializePreferenceError(err, key.to_string())),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for PreferenceValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for PreferenceValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<FolderRef>> for PreferenceValue {
    fn from(folders: Vec<FolderRef>) -> Self {
        Self::Folders(folders)
    }
}

/// One entry of a stored folder list.
///
/// Older versions stored bare folder ids instead of whole references.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFolder {
    Ref(FolderRef),
    Id(String),
}

impl StoredFolder {
    fn into_id(self) -> String {
        match self {
            Self::Ref(folder) => folder.id(),
            Self::Id(id) => id,
        }
    }
}

/// The user preferences.
///
/// One field per preference key. [`Default`] gives the value used
/// when nothing has been stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Preferences {
    pub empty_trash: bool,
    pub empty_junk: bool,
    pub compact_folders: bool,

    pub multi_trash_accounts: Vec<FolderRef>,
    pub multi_junk_accounts: Vec<FolderRef>,
    pub multi_compact_folders: Vec<FolderRef>,

    pub timer_trash_accounts: Vec<FolderRef>,
    pub timer_junk_accounts: Vec<FolderRef>,
    pub timer_compact_folders: Vec<FolderRef>,

    pub timer_interval_enabled: bool,
    /// Delay after startup before the first run, in minutes.
    pub timer_interval_startup: String,
    /// Delay between two runs, in minutes.
    pub timer_interval_loop: String,

    pub timer_absolute_enabled: bool,
    /// Daily run time, formatted `HH:MM`.
    pub timer_absolute: String,

    pub confirm_single_action: bool,
    pub confirm_multi_action: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            empty_trash: true,
            empty_junk: false,
            compact_folders: true,
            multi_trash_accounts: Vec::new(),
            multi_junk_accounts: Vec::new(),
            multi_compact_folders: Vec::new(),
            timer_trash_accounts: Vec::new(),
            timer_junk_accounts: Vec::new(),
            timer_compact_folders: Vec::new(),
            timer_interval_enabled: false,
            timer_interval_startup: String::from("0"),
            timer_interval_loop: String::from("0"),
            timer_absolute_enabled: false,
            timer_absolute: String::from("00:00"),
            confirm_single_action: false,
            confirm_multi_action: false,
        }
    }
}

impl Preferences {
    /// Get the value of the given preference.
    pub fn get(&self, key: PreferenceKey) -> PreferenceValue {
        use PreferenceKey::*;

        match key {
            EmptyTrash => self.empty_trash.into(),
            EmptyJunk => self.empty_junk.into(),
            CompactFolders => self.compact_folders.into(),
            MultiTrashAccounts => self.multi_trash_accounts.clone().into(),
            MultiJunkAccounts => self.multi_junk_accounts.clone().into(),
            MultiCompactFolders => self.multi_compact_folders.clone().into(),
            TimerTrashAccounts => self.timer_trash_accounts.clone().into(),
            TimerJunkAccounts => self.timer_junk_accounts.clone().into(),
            TimerCompactFolders => self.timer_compact_folders.clone().into(),
            TimerIntervalEnabled => self.timer_interval_enabled.into(),
            TimerIntervalStartup => self.timer_interval_startup.clone().into(),
            TimerIntervalLoop => self.timer_interval_loop.clone().into(),
            TimerAbsoluteEnabled => self.timer_absolute_enabled.into(),
            TimerAbsolute => self.timer_absolute.clone().into(),
            ConfirmSingleAction => self.confirm_single_action.into(),
            ConfirmMultiAction => self.confirm_multi_action.into(),
        }
    }

    /// Set the value of the given preference.
    ///
    /// Fails if the value kind does not match the key kind.
    pub fn set(&mut self, key: PreferenceKey, value: PreferenceValue) -> Result<()> {
        use PreferenceKey::*;
        use PreferenceValue::*;

        match (key, value) {
            (EmptyTrash, Bool(b)) => self.empty_trash = b,
            (EmptyJunk, Bool(b)) => self.empty_junk = b,
            (CompactFolders, Bool(b)) => self.compact_folders = b,
            (MultiTrashAccounts, Folders(f)) => self.multi_trash_accounts = f,
            (MultiJunkAccounts, Folders(f)) => self.multi_junk_accounts = f,
            (MultiCompactFolders, Folders(f)) => self.multi_compact_folders = f,
            (TimerTrashAccounts, Folders(f)) => self.timer_trash_accounts = f,
            (TimerJunkAccounts, Folders(f)) => self.timer_junk_accounts = f,
            (TimerCompactFolders, Folders(f)) => self.timer_compact_folders = f,
            (TimerIntervalEnabled, Bool(b)) => self.timer_interval_enabled = b,
            (TimerIntervalStartup, Text(s)) => self.timer_interval_startup = s,
            (TimerIntervalLoop, Text(s)) => self.timer_interval_loop = s,
            (TimerAbsoluteEnabled, Bool(b)) => self.timer_absolute_enabled = b,
            (TimerAbsolute, Text(s)) => self.timer_absolute = s,
            (ConfirmSingleAction, Bool(b)) => self.confirm_single_action = b,
            (ConfirmMultiAction, Bool(b)) => self.confirm_multi_action = b,
            (key, _) => {
                return Err(Error::InvalidPreferenceValueError(
                    key.to_string(),
                    key.kind().as_str(),
                ))
            }
        }

        Ok(())
    }
}

/// The preference adapter.
///
/// Reads and writes typed preferences from a [`PreferenceStore`],
/// using the [`MailboxBackend`] to check that stored folders still
/// exist.
#[derive(Clone)]
pub struct PreferenceAdapter {
    store: Arc<dyn PreferenceStore>,
    backend: Arc<dyn MailboxBackend>,
}

impl PreferenceAdapter {
    pub fn new(store: Arc<dyn PreferenceStore>, backend: Arc<dyn MailboxBackend>) -> Self {
        Self { store, backend }
    }

    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }

    /// Read all preferences at once.
    pub async fn get_all(&self) -> Result<Preferences> {
        let mut preferences = Preferences::default();

        for key in PreferenceKey::ALL {
            let value = self.get(key).await?;
            preferences.set(key, value)?;
        }

        Ok(preferences)
    }

    /// Read the given preference.
    ///
    /// Missing or mistyped values give the default value. Folder
    /// lists only contain folders that still exist.
    pub async fn get(&self, key: PreferenceKey) -> Result<PreferenceValue> {
        let default = || Preferences::default().get(key);

        let value = match self.store.get(&key.storage_key()).await? {
            None => return Ok(default()),
            Some(value) => value,
        };

        if let (PreferenceKind::Folders, Value::Array(entries)) = (key.kind(), &value) {
            let folders = self.resolve_stored_folders(key, entries).await;
            return Ok(PreferenceValue::Folders(folders));
        }

        match PreferenceValue::decode(key.kind(), value) {
            Some(value) => Ok(value),
            None => {
                warn!(%key, "invalid stored preference, using default value");
                Ok(default())
            }
        }
    }

    /// Resolve every entry of a stored folder list, one by one.
    ///
    /// Malformed entries and folders that do not exist anymore are
    /// dropped, the other ones keep their relative order.
    async fn resolve_stored_folders(
        &self,
        key: PreferenceKey,
        entries: &[Value],
    ) -> Vec<FolderRef> {
        let mut resolved = Vec::with_capacity(entries.len());

        for entry in entries {
            let id = match StoredFolder::deserialize(entry) {
                Ok(folder) => folder.into_id(),
                Err(err) => {
                    warn!(%key, ?entry, "invalid stored folder: {err}");
                    continue;
                }
            };

            match self.backend.resolve_folder(&id).await {
                Ok(Some(folder)) => resolved.push(folder),
                Ok(None) => {
                    warn!(%key, folder = id, "stored folder no longer exists");
                }
                Err(err) => {
                    warn!(%key, folder = id, "cannot resolve stored folder: {err}");
                }
            }
        }

        resolved
    }

    /// Write the given preference.
    ///
    /// Folders that cannot be resolved anymore are removed from the
    /// list before it gets persisted.
    pub async fn set(&self, key: PreferenceKey, value: impl Into<PreferenceValue>) -> Result<()> {
        let value = value.into();

        if value.kind() != key.kind() {
            return Err(Error::InvalidPreferenceValueError(
                key.to_string(),
                key.kind().as_str(),
            ));
        }

        let value = match value {
            PreferenceValue::Folders(folders) => {
                let mut valid = Vec::with_capacity(folders.len());

                for folder in folders {
                    match self.backend.resolve_folder(&folder.id()).await {
                        Ok(Some(_)) => valid.push(folder),
                        Ok(None) => {
                            info!(%key, folder = %folder, "removing inaccessible folder");
                        }
                        Err(err) => {
                            info!(%key, folder = %folder, "removing invalid folder: {err}");
                        }
                    }
                }

                PreferenceValue::Folders(valid)
            }
            value => value,
        };

        debug!(%key, ?value, "storing preference");
        self.store
            .set(&key.storage_key(), value.encode(key)?)
            .await
    }
}
