//! # Error
//!
//! Module dedicated to xpunge errors. It contains an [`Error`] enum
//! based on [`thiserror::Error`] and a type alias [`Result`].

use std::{io, path::PathBuf};

use thiserror::Error;

/// The host status code meaning that a folder summary is out of date
/// and needs to be refreshed before it can be compacted.
pub const FOLDER_NOT_REFRESHED_STATUS: u32 = 0x8055_0025;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The mail store error.
///
/// Opaque failure reported by the host mail store, either as a raw
/// status code or as a free message.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("mail store returned status code {0:#x}")]
    Status(u32),
    #[error("{0}")]
    Message(String),
}

impl StoreError {
    pub fn status(&self) -> Option<u32> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Message(_) => None,
        }
    }
}

impl From<&str> for StoreError {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_owned())
    }
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot empty junk folder {1}")]
    EmptyJunkError(#[source] StoreError, String),
    #[error("cannot empty trash folder {1}")]
    EmptyTrashError(#[source] StoreError, String),
    #[error("cannot compact folder {1}")]
    CompactFolderError(#[source] StoreError, String),
    #[error("cannot compact folder {0}: folder not refreshed, select it in the mail client first")]
    FolderNotRefreshedError(String),
    #[error("cannot get native folder {1}")]
    GetFolderError(#[source] StoreError, String),
    #[error("cannot get account {1}")]
    GetAccountError(#[source] StoreError, String),
    #[error("cannot resolve folder {1}")]
    ResolveFolderError(#[source] StoreError, String),

    #[error("cannot lock preference store: {0}")]
    LockPreferenceStoreError(String),
    #[error("cannot read preferences file at {1}")]
    ReadPreferencesFileError(#[source] io::Error, PathBuf),
    #[error("cannot parse preferences file at {1}")]
    ParsePreferencesFileError(#[source] serde_json::Error, PathBuf),
    #[error("cannot write preferences file at {1}")]
    WritePreferencesFileError(#[source] io::Error, PathBuf),
    #[error("cannot serialize preference {1}")]
    SerializePreferenceError(#[source] serde_json::Error, String),
    #[error("cannot store preference {0}: expected a {1} value")]
    InvalidPreferenceValueError(String, &'static str),

    #[error("cannot parse timer interval {0}: interval is empty")]
    EmptyIntervalError(&'static str),
    #[error("cannot parse timer interval {0}: invalid value {1:?}")]
    ParseIntervalError(&'static str, String),
    #[error("cannot parse absolute timer {0:?}: expected HH:MM")]
    ParseAbsoluteTimeError(String),

    #[error("cannot ask for confirmation")]
    ConfirmError(#[source] StoreError),
}

impl Error {
    /// Build the error matching a failed compaction.
    ///
    /// The out of date folder summary status gets its own variant, so
    /// that hosts can advise users to refresh the folder.
    pub fn compact_folder(err: StoreError, folder: impl ToString) -> Self {
        match err.status() {
            Some(FOLDER_NOT_REFRESHED_STATUS) => Self::FolderNotRefreshedError(folder.to_string()),
            _ => Self::CompactFolderError(err, folder.to_string()),
        }
    }
}
