use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use async_trait::async_trait;
use xpunge::{
    backend::{
        native::{FolderFlag, MailStore, NativeBackend, NativeFolder, ServerKind, StoreResult},
        MailboxBackend,
    },
    Error, FolderRef, StoreError, FOLDER_NOT_REFRESHED_STATUS,
};

#[derive(Clone, Debug)]
struct Entry {
    native: NativeFolder,
    flag: Option<FolderFlag>,
    messages: usize,
    subfolders: Vec<String>,
    search_folders: Vec<String>,
}

/// Mail store keeping a folder tree in memory and logging every
/// mutation as `<operation> <folder id>`.
#[derive(Debug, Default)]
struct MemoryMailStore {
    entries: Mutex<BTreeMap<String, Entry>>,
    accounts: HashMap<String, String>,
    failures: HashMap<String, StoreError>,
    log: Mutex<Vec<String>>,
}

impl MemoryMailStore {
    fn with_account(mut self, id: &str, name: &str, server: &str) -> Self {
        self.accounts.insert(id.to_owned(), name.to_owned());
        self.insert(Entry {
            native: native(FolderRef::root(id), server, name),
            flag: None,
            messages: 0,
            subfolders: Vec::new(),
            search_folders: Vec::new(),
        })
    }

    fn with_folder(
        self,
        account_id: &str,
        name: &str,
        flag: Option<FolderFlag>,
        messages: usize,
    ) -> Self {
        let root = self.entry(&FolderRef::root(account_id).id());
        let folder = FolderRef::new(account_id, format!("/{name}"), name);
        let native = NativeFolder {
            folder,
            ..root.native
        };

        self.insert(Entry {
            native,
            flag,
            messages,
            subfolders: Vec::new(),
            search_folders: Vec::new(),
        })
    }

    fn with_subfolder(self, account_id: &str, parent: &str, name: &str) -> Self {
        let path = format!("{parent}/{name}");
        let this = self.with_folder(account_id, &path, None, 1);
        let id = FolderRef::new(account_id, format!("/{path}"), "").id();
        this.update(&format!("{account_id}://{parent}"), |entry| {
            entry.subfolders.push(id)
        })
    }

    fn with_expunged_bytes(self, id: &str, bytes: u64) -> Self {
        self.update(id, |entry| entry.native.expunged_bytes = bytes)
    }

    /// Turn the given account into a smart server aggregating the
    /// given folders into its own folder of the given flag.
    fn with_virtual(self, account_id: &str, flag: FolderFlag, search_folders: &[&str]) -> Self {
        let root_id = FolderRef::root(account_id).id();
        let name = format!("{flag:?}");
        let this = self
            .update(&root_id, |entry| entry.native.is_virtual = true)
            .with_folder(account_id, &name, Some(flag), 0);

        let search_folders = search_folders.iter().map(ToString::to_string).collect();
        this.update(&format!("{account_id}://{name}"), move |entry| {
            entry.native.is_virtual = true;
            entry.search_folders = search_folders;
        })
    }

    fn failing(mut self, operation: &str, id: &str, err: StoreError) -> Self {
        self.failures.insert(format!("{operation} {id}"), err);
        self
    }

    fn insert(self, entry: Entry) -> Self {
        let id = entry.native.folder.id();
        self.entries.lock().unwrap().insert(id, entry);
        self
    }

    fn update(self, id: &str, f: impl FnOnce(&mut Entry)) -> Self {
        f(self.entries.lock().unwrap().get_mut(id).unwrap());
        self
    }

    fn entry(&self, id: &str) -> Entry {
        self.entries.lock().unwrap()[id].clone()
    }

    fn natives(&self, ids: &[String]) -> Vec<NativeFolder> {
        ids.iter().map(|id| self.entry(id).native).collect()
    }

    fn record(&self, operation: &str, folder: &NativeFolder) -> StoreResult<()> {
        let line = format!("{operation} {}", folder.folder.id());
        self.log.lock().unwrap().push(line.clone());

        match self.failures.get(&line) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

fn native(folder: FolderRef, server: &str, server_name: &str) -> NativeFolder {
    NativeFolder {
        folder,
        server: ServerKind::from(server),
        server_name: server_name.to_owned(),
        is_virtual: false,
        expunged_bytes: 0,
    }
}

#[async_trait]
impl MailStore for MemoryMailStore {
    async fn get_folder(&self, folder: &FolderRef) -> StoreResult<NativeFolder> {
        let entries = self.entries.lock().unwrap();
        match entries.get(&folder.id()) {
            Some(entry) => Ok(entry.native.clone()),
            None => Err(StoreError::from(format!("folder {folder} not found"))),
        }
    }

    async fn get_root_folder(&self, folder: &FolderRef) -> StoreResult<NativeFolder> {
        self.get_folder(&FolderRef::root(&folder.account_id)).await
    }

    async fn list_folders_with_flag(
        &self,
        root: &NativeFolder,
        flag: FolderFlag,
    ) -> StoreResult<Vec<NativeFolder>> {
        let entries = self.entries.lock().unwrap();
        let folders = entries
            .values()
            .filter(|entry| entry.native.folder.account_id == root.folder.account_id)
            .filter(|entry| entry.flag == Some(flag))
            .map(|entry| entry.native.clone())
            .collect();
        Ok(folders)
    }

    async fn list_root_folders(&self) -> StoreResult<Vec<NativeFolder>> {
        let entries = self.entries.lock().unwrap();
        let roots = entries
            .values()
            .filter(|entry| entry.native.is_server() && !entry.native.is_virtual)
            .map(|entry| entry.native.clone())
            .collect();
        Ok(roots)
    }

    async fn list_search_folders(&self, folder: &NativeFolder) -> StoreResult<Vec<NativeFolder>> {
        let ids = self.entry(&folder.folder.id()).search_folders;
        Ok(self.natives(&ids))
    }

    async fn list_subfolders(&self, folder: &NativeFolder) -> StoreResult<Vec<NativeFolder>> {
        let ids = self.entry(&folder.folder.id()).subfolders;
        Ok(self.natives(&ids))
    }

    async fn delete_subfolder(
        &self,
        parent: &NativeFolder,
        sub: &NativeFolder,
    ) -> StoreResult<()> {
        self.record("delete_subfolder", sub)?;
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&sub.folder.id());
        if let Some(parent) = entries.get_mut(&parent.folder.id()) {
            parent.subfolders.retain(|id| *id != sub.folder.id());
        }
        Ok(())
    }

    async fn count_messages(&self, folder: &NativeFolder) -> StoreResult<usize> {
        Ok(self.entry(&folder.folder.id()).messages)
    }

    async fn delete_messages(&self, folder: &NativeFolder) -> StoreResult<()> {
        self.record("delete_messages", folder)?;
        if let Some(entry) = self.entries.lock().unwrap().get_mut(&folder.folder.id()) {
            entry.messages = 0;
        }
        Ok(())
    }

    async fn empty_trash(&self, folder: &NativeFolder) -> StoreResult<()> {
        self.record("empty_trash", folder)
    }

    fn empty_trash_detached(&self, folder: &NativeFolder) -> StoreResult<()> {
        self.record("empty_trash_detached", folder)
    }

    async fn refresh(&self, folder: &NativeFolder) -> StoreResult<()> {
        self.record("refresh", folder)
    }

    async fn compact(&self, folder: &NativeFolder) -> StoreResult<()> {
        self.record("compact", folder)
    }

    async fn compact_all(&self, root: &NativeFolder) -> StoreResult<()> {
        self.record("compact_all", root)
    }

    async fn get_account_name(&self, account_id: &str) -> StoreResult<Option<String>> {
        Ok(self.accounts.get(account_id).cloned())
    }

    async fn find_folder(&self, id: &str) -> StoreResult<Option<FolderRef>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(id).map(|entry| entry.native.folder.clone()))
    }
}

fn backend(store: MemoryMailStore) -> (std::sync::Arc<MemoryMailStore>, NativeBackend) {
    let store = std::sync::Arc::new(store);
    (store.clone(), NativeBackend::from_arc(store))
}

fn folder(account_id: &str, name: &str) -> FolderRef {
    FolderRef::new(account_id, format!("/{name}"), name)
}

#[test_log::test(tokio::test)]
async fn empty_junk_deletes_subfolders_then_messages() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Junk", Some(FolderFlag::Junk), 3)
            .with_subfolder("account1", "Junk", "Old"),
    );

    backend.empty_junk(&FolderRef::root("account1")).await.unwrap();

    assert_eq!(
        store.log(),
        vec![
            "delete_subfolder account1://Junk/Old",
            "delete_messages account1://Junk",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn empty_junk_skips_empty_folders() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Junk", Some(FolderFlag::Junk), 0),
    );

    backend.empty_junk(&FolderRef::root("account1")).await.unwrap();

    assert!(store.log().is_empty());
}

#[test_log::test(tokio::test)]
async fn empty_junk_expands_unified_folders() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Junk", Some(FolderFlag::Junk), 2)
            .with_account("account2", "Work", "pop3")
            .with_folder("account2", "Spam", Some(FolderFlag::Junk), 5)
            .with_account("smart", "Unified Folders", "none")
            .with_virtual("smart", FolderFlag::Junk, &["account1://Junk", "account2://Spam"]),
    );

    backend.empty_junk(&FolderRef::root("smart")).await.unwrap();

    assert_eq!(
        store.log(),
        vec![
            "delete_messages account1://Junk",
            "delete_messages account2://Spam",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn empty_junk_keeps_going_after_failure() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Junk", Some(FolderFlag::Junk), 2)
            .with_folder("account1", "Spam", Some(FolderFlag::Junk), 2)
            .failing("delete_messages", "account1://Junk", StoreError::from("locked")),
    );

    let err = backend
        .empty_junk(&FolderRef::root("account1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyJunkError(_, ref id) if id == "account1://Junk"));
    assert_eq!(store.log().last().unwrap(), "delete_messages account1://Spam");
}

#[test_log::test(tokio::test)]
async fn empty_trash_waits_for_remote_servers_only() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Trash", Some(FolderFlag::Trash), 4)
            .with_account("account2", "Local Folders", "none")
            .with_folder("account2", "Trash", Some(FolderFlag::Trash), 4),
    );

    backend.empty_trash(&FolderRef::root("account1")).await.unwrap();
    backend.empty_trash(&folder("account2", "Trash")).await.unwrap();

    assert_eq!(
        store.log(),
        vec![
            "empty_trash account1://Trash",
            "empty_trash_detached account2://Trash",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn empty_trash_without_trash_folder() {
    let (store, backend) = backend(MemoryMailStore::default().with_account("account1", "Feeds", "rss"));

    backend.empty_trash(&FolderRef::root("account1")).await.unwrap();

    assert!(store.log().is_empty());
}

#[test_log::test(tokio::test)]
async fn empty_trash_of_unified_folders_empties_every_server() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Trash", Some(FolderFlag::Trash), 1)
            .with_account("account2", "Work", "pop3")
            .with_folder("account2", "Trash", Some(FolderFlag::Trash), 1)
            .with_account("smart", "Unified Folders", "none")
            .with_virtual("smart", FolderFlag::Trash, &["account1://Trash", "account2://Trash"]),
    );

    backend.empty_trash(&FolderRef::root("smart")).await.unwrap();

    assert_eq!(
        store.log(),
        vec![
            "empty_trash account1://Trash",
            "empty_trash_detached account2://Trash",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn compact_root_compacts_whole_account() {
    let (store, backend) = backend(MemoryMailStore::default().with_account("account1", "Home", "imap"));

    backend.compact(&FolderRef::root("account1")).await.unwrap();

    assert_eq!(store.log(), vec!["compact_all account1://"]);
}

#[test_log::test(tokio::test)]
async fn compact_local_folder_only_when_needed() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Local Folders", "none")
            .with_folder("account1", "Inbox", None, 10)
            .with_folder("account1", "Archives", None, 10)
            .with_expunged_bytes("account1://Archives", 4096),
    );

    backend.compact(&folder("account1", "Inbox")).await.unwrap();
    backend.compact(&folder("account1", "Archives")).await.unwrap();

    assert_eq!(store.log(), vec!["compact account1://Archives"]);
}

#[test_log::test(tokio::test)]
async fn compact_imap_folder_refreshes_it_first() {
    let (store, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Inbox", None, 10)
            .with_folder("account1", "Sent", None, 10)
            .failing("refresh", "account1://Sent", StoreError::from("offline")),
    );

    backend.compact(&folder("account1", "Inbox")).await.unwrap();
    backend.compact(&folder("account1", "Sent")).await.unwrap();

    assert_eq!(
        store.log(),
        vec![
            "refresh account1://Inbox",
            "compact account1://Inbox",
            "refresh account1://Sent",
            "compact account1://Sent",
        ]
    );
}

#[test_log::test(tokio::test)]
async fn compact_not_refreshed_folder() {
    let (_, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Inbox", None, 10)
            .failing(
                "compact",
                "account1://Inbox",
                StoreError::Status(FOLDER_NOT_REFRESHED_STATUS),
            ),
    );

    let err = backend.compact(&folder("account1", "Inbox")).await.unwrap_err();

    assert!(matches!(err, Error::FolderNotRefreshedError(ref id) if id == "account1://Inbox"));
}

#[test_log::test(tokio::test)]
async fn resolve_and_name_lookups() {
    let (_, backend) = backend(
        MemoryMailStore::default()
            .with_account("account1", "Home", "imap")
            .with_folder("account1", "Inbox", None, 0),
    );

    assert_eq!(
        backend.resolve_folder("account1://Inbox").await.unwrap(),
        Some(folder("account1", "Inbox"))
    );
    assert_eq!(backend.resolve_folder("account1://Gone").await.unwrap(), None);
    assert_eq!(
        backend.get_account_name("account1").await.unwrap(),
        Some("Home".into())
    );
    assert_eq!(backend.get_account_name("account2").await.unwrap(), None);
}
