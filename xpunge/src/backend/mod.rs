//! # Backend
//!
//! Module dedicated to the mailbox backend. The [`MailboxBackend`]
//! trait is the only door the orchestrators use to reach the host
//! mail client: emptying junk and trash, compacting, looking up
//! accounts and resolving stored folder references.
//!
//! The [`native`] module exposes a [`MailboxBackend`] implementation
//! built on top of a lower level [`native::MailStore`], which is what
//! hosts usually implement.

pub mod native;

use async_trait::async_trait;

use crate::{folder::FolderRef, Result};

#[async_trait]
pub trait MailboxBackend: Send + Sync {
    /// Empty the junk folder(s) of the account owning the given
    /// folder.
    async fn empty_junk(&self, folder: &FolderRef) -> Result<()>;

    /// Empty the trash folder(s) of the account owning the given
    /// folder.
    async fn empty_trash(&self, folder: &FolderRef) -> Result<()>;

    /// Compact the given folder, or all the folders of the account if
    /// the given folder is a root folder.
    async fn compact(&self, folder: &FolderRef) -> Result<()>;

    /// Get the display name of the given account.
    ///
    /// Returns `None` if the account does not exist.
    async fn get_account_name(&self, account_id: &str) -> Result<Option<String>>;

    /// Resolve the folder matching the given identifier.
    ///
    /// Returns `None` if the folder does not exist anymore.
    async fn resolve_folder(&self, id: &str) -> Result<Option<FolderRef>>;
}
