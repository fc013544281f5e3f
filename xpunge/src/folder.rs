//! # Folder
//!
//! Module dedicated to folder references. A [`FolderRef`] identifies
//! a mailbox folder of the host mail client. References are produced
//! by the host backend: the library only keeps them in preferences
//! and forwards them back to the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The folder reference structure.
///
/// The couple account id and path is unique. The root reference of
/// an account represents the whole account.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRef {
    /// The opaque identifier of the account owning the folder.
    pub account_id: String,

    /// The path of the folder, unique within its account.
    pub path: String,

    /// The display name of the folder.
    #[serde(default)]
    pub name: String,

    /// Whether the folder is the top-level folder of its account.
    #[serde(default)]
    pub is_root: bool,
}

impl FolderRef {
    pub fn new(account_id: impl ToString, path: impl ToString, name: impl ToString) -> Self {
        Self {
            account_id: account_id.to_string(),
            path: path.to_string(),
            name: name.to_string(),
            is_root: false,
        }
    }

    /// Build the root folder reference of the given account.
    pub fn root(account_id: impl ToString) -> Self {
        Self {
            account_id: account_id.to_string(),
            path: String::from("/"),
            name: String::from("Root"),
            is_root: true,
        }
    }

    /// Return the identifier used by the backend to resolve the
    /// folder, in the form `<account id>:/<path>`.
    pub fn id(&self) -> String {
        format!("{}:/{}", self.account_id, self.path)
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
