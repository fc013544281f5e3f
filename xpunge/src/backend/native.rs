//! # Native backend
//!
//! Module dedicated to the [`MailboxBackend`] implementation based on
//! the host native folder system. The host exposes its folders
//! through the [`MailStore`] trait, and the [`NativeBackend`] knows
//! how to combine them in order to empty junk, empty trash and
//! compact.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    error::{StoreError, FOLDER_NOT_REFRESHED_STATUS},
    folder::FolderRef,
    Error, Result,
};

use super::MailboxBackend;

/// The mail store `Result` alias.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The kind of server an account talks to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServerKind {
    /// Local folders.
    None,
    Rss,
    Pop3,
    Owl,
    Imap,
    Other(String),
}

impl ServerKind {
    /// Return `true` if the server signals the end of an empty trash
    /// operation.
    ///
    /// Local kinds empty their trash straight away and never call
    /// back, waiting for them would block forever.
    pub fn notifies_empty_trash(&self) -> bool {
        !matches!(self, Self::None | Self::Rss | Self::Pop3 | Self::Owl)
    }

    /// Return `true` if folders of this kind keep track of the amount
    /// of bytes that compaction would reclaim.
    pub fn tracks_expunged_bytes(&self) -> bool {
        !matches!(self, Self::Imap)
    }
}

impl From<&str> for ServerKind {
    fn from(kind: &str) -> Self {
        match kind {
            "none" => Self::None,
            "rss" => Self::Rss,
            "pop3" => Self::Pop3,
            "owl" => Self::Owl,
            "imap" => Self::Imap,
            kind => Self::Other(kind.to_owned()),
        }
    }
}

/// Special-use flags of native folders.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FolderFlag {
    Junk,
    Trash,
}

/// The native folder, as seen by the host mail store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NativeFolder {
    pub folder: FolderRef,

    /// The kind of server owning the folder.
    pub server: ServerKind,

    /// The display name of the server owning the folder.
    pub server_name: String,

    /// Whether the folder is a smart virtual folder aggregating
    /// folders from several accounts (unified junk, unified trash).
    pub is_virtual: bool,

    /// The amount of bytes compaction would reclaim.
    pub expunged_bytes: u64,
}

impl NativeFolder {
    pub fn is_server(&self) -> bool {
        self.folder.is_root
    }
}

/// The host native folder system.
///
/// All operations are one-shot: they resolve once the host reports
/// success or failure.
#[async_trait]
pub trait MailStore: Send + Sync {
    /// Get the native folder matching the given reference.
    async fn get_folder(&self, folder: &FolderRef) -> StoreResult<NativeFolder>;

    /// Get the root folder of the account owning the given folder.
    async fn get_root_folder(&self, folder: &FolderRef) -> StoreResult<NativeFolder>;

    /// List all folders under the given root having the given flag.
    async fn list_folders_with_flag(
        &self,
        root: &NativeFolder,
        flag: FolderFlag,
    ) -> StoreResult<Vec<NativeFolder>>;

    /// List the root folders of all servers.
    async fn list_root_folders(&self) -> StoreResult<Vec<NativeFolder>>;

    /// List the folders a smart virtual folder aggregates.
    async fn list_search_folders(&self, folder: &NativeFolder) -> StoreResult<Vec<NativeFolder>>;

    /// List the direct subfolders of the given folder.
    async fn list_subfolders(&self, folder: &NativeFolder) -> StoreResult<Vec<NativeFolder>>;

    /// Delete the given subfolder and everything below it.
    async fn delete_subfolder(&self, parent: &NativeFolder, sub: &NativeFolder)
        -> StoreResult<()>;

    async fn count_messages(&self, folder: &NativeFolder) -> StoreResult<usize>;

    /// Definitely delete all messages of the given folder, without
    /// undo.
    async fn delete_messages(&self, folder: &NativeFolder) -> StoreResult<()>;

    /// Empty the given trash folder and wait for completion.
    async fn empty_trash(&self, folder: &NativeFolder) -> StoreResult<()>;

    /// Empty the given trash folder without waiting for any
    /// completion signal.
    fn empty_trash_detached(&self, folder: &NativeFolder) -> StoreResult<()>;

    /// Refresh the metadata of the given folder.
    async fn refresh(&self, folder: &NativeFolder) -> StoreResult<()>;

    async fn compact(&self, folder: &NativeFolder) -> StoreResult<()>;

    /// Compact all folders of the given root folder.
    async fn compact_all(&self, root: &NativeFolder) -> StoreResult<()>;

    async fn get_account_name(&self, account_id: &str) -> StoreResult<Option<String>>;

    async fn find_folder(&self, id: &str) -> StoreResult<Option<FolderRef>>;
}

/// The [`MailboxBackend`] built on top of a [`MailStore`].
#[derive(Clone)]
pub struct NativeBackend {
    store: Arc<dyn MailStore>,
}

impl NativeBackend {
    pub fn new(store: impl MailStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_arc(store: Arc<dyn MailStore>) -> Self {
        Self { store }
    }

    /// Empty the given junk folder.
    ///
    /// Smart virtual folders are expanded into the folders they
    /// aggregate. Concrete folders lose their subfolders first, then
    /// their messages.
    async fn empty_junk_folder(&self, junk: NativeFolder) -> StoreResult<()> {
        let mut queue = vec![junk];

        while let Some(folder) = queue.pop() {
            if folder.is_virtual {
                let mut search_folders = self.store.list_search_folders(&folder).await?;
                search_folders.reverse();
                queue.extend(search_folders);
                continue;
            }

            for sub in self.store.list_subfolders(&folder).await? {
                self.store.delete_subfolder(&folder, &sub).await?;
            }

            if self.store.count_messages(&folder).await? == 0 {
                debug!(folder = %folder.folder, "no message to delete, skipping");
                continue;
            }

            self.store.delete_messages(&folder).await?;
        }

        Ok(())
    }

    async fn empty_trash_folder(&self, trash: &NativeFolder) -> StoreResult<()> {
        if trash.server.notifies_empty_trash() {
            self.store.empty_trash(trash).await
        } else {
            self.store.empty_trash_detached(trash)
        }
    }

    /// Refresh IMAP folders before compaction, so that the host does
    /// not refuse to compact a folder it never loaded.
    async fn refresh_before_compact(&self, folder: &NativeFolder) {
        if folder.server != ServerKind::Imap || folder.is_server() {
            return;
        }

        if let Err(err) = self.store.refresh(folder).await {
            debug!(folder = %folder.folder, "cannot refresh folder, compacting anyway: {err}");
        }
    }
}

#[async_trait]
impl MailboxBackend for NativeBackend {
    async fn empty_junk(&self, folder: &FolderRef) -> Result<()> {
        let root = self
            .store
            .get_root_folder(folder)
            .await
            .map_err(|err| Error::GetFolderError(err, folder.id()))?;
        let junk_folders = self
            .store
            .list_folders_with_flag(&root, FolderFlag::Junk)
            .await
            .map_err(|err| Error::GetFolderError(err, root.folder.id()))?;

        let mut first_err = None;

        for junk in junk_folders {
            let id = junk.folder.id();
            info!(account = root.server_name, folder = id, "emptying junk folder");

            match self.empty_junk_folder(junk).await {
                Ok(()) => debug!(folder = id, "junk folder emptied"),
                Err(err) => {
                    warn!(
                        account = root.server_name,
                        folder = id,
                        "cannot empty junk folder: {err}"
                    );
                    first_err.get_or_insert(Error::EmptyJunkError(err, id));
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn empty_trash(&self, folder: &FolderRef) -> Result<()> {
        let root = self
            .store
            .get_root_folder(folder)
            .await
            .map_err(|err| Error::GetFolderError(err, folder.id()))?;

        info!(account = root.server_name, "emptying trash");

        let account_trash = self
            .store
            .list_folders_with_flag(&root, FolderFlag::Trash)
            .await
            .map_err(|err| Error::GetFolderError(err, root.folder.id()))?
            .into_iter()
            .next();

        let Some(account_trash) = account_trash else {
            debug!(account = root.server_name, "no trash folder found, skipping");
            return Ok(());
        };

        if root.is_virtual {
            // unified trash: empty the trash of every server
            let roots = self
                .store
                .list_root_folders()
                .await
                .map_err(|err| Error::GetFolderError(err, root.folder.id()))?;

            for server_root in roots {
                let trash_folders = self
                    .store
                    .list_folders_with_flag(&server_root, FolderFlag::Trash)
                    .await
                    .map_err(|err| Error::GetFolderError(err, server_root.folder.id()))?;

                for trash in trash_folders {
                    self.empty_trash_folder(&trash)
                        .await
                        .map_err(|err| Error::EmptyTrashError(err, trash.folder.id()))?;
                }
            }
        } else {
            self.empty_trash_folder(&account_trash)
                .await
                .map_err(|err| Error::EmptyTrashError(err, account_trash.folder.id()))?;
        }

        debug!(account = root.server_name, "trash emptied");
        Ok(())
    }

    async fn compact(&self, folder: &FolderRef) -> Result<()> {
        let native = self
            .store
            .get_folder(folder)
            .await
            .map_err(|err| Error::GetFolderError(err, folder.id()))?;

        self.refresh_before_compact(&native).await;

        let res = if native.is_server() {
            info!(account = native.server_name, "compacting all folders of account");
            self.store.compact_all(&native).await
        } else {
            if native.server.tracks_expunged_bytes() && native.expunged_bytes == 0 {
                debug!(
                    account = native.server_name,
                    folder = %native.folder,
                    "nothing to compact, skipping"
                );
                return Ok(());
            }

            info!(account = native.server_name, folder = %native.folder, "compacting folder");
            self.store.compact(&native).await
        };

        match res {
            Ok(()) => {
                debug!(folder = %native.folder, "compaction done");
                Ok(())
            }
            Err(err) if err.status() == Some(FOLDER_NOT_REFRESHED_STATUS) => {
                warn!(
                    account = native.server_name,
                    folder = %native.folder,
                    "cannot compact: folder not refreshed, please select it in the mail client first"
                );
                Err(Error::compact_folder(err, folder.id()))
            }
            Err(err) => {
                warn!(
                    account = native.server_name,
                    folder = %native.folder,
                    "cannot compact: {err}"
                );
                Err(Error::compact_folder(err, folder.id()))
            }
        }
    }

    async fn get_account_name(&self, account_id: &str) -> Result<Option<String>> {
        self.store
            .get_account_name(account_id)
            .await
            .map_err(|err| Error::GetAccountError(err, account_id.to_owned()))
    }

    async fn resolve_folder(&self, id: &str) -> Result<Option<FolderRef>> {
        self.store
            .find_folder(id)
            .await
            .map_err(|err| Error::ResolveFolderError(err, id.to_owned()))
    }
}
