#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone};
use xpunge::{
    backend::MailboxBackend, clock::Clock, preferences::MemoryPreferenceStore,
    prompt::UserPrompt, Error, FolderRef, Result, StoreError, Xpunge,
};

/// Backend operation recorded by the [`MockBackend`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Call {
    EmptyJunk(String),
    EmptyTrash(String),
    Compact(String),
    GetAccountName(String),
}

/// Backend recording every call, with scripted failures.
#[derive(Debug, Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    accounts: HashMap<String, String>,
    folders: HashMap<String, FolderRef>,
    failing_calls: HashSet<Call>,
    failing_resolutions: HashSet<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, id: &str, name: &str) -> Self {
        self.accounts.insert(id.to_owned(), name.to_owned());
        self
    }

    pub fn with_folder(mut self, folder: &FolderRef) -> Self {
        self.folders.insert(folder.id(), folder.clone());
        self
    }

    pub fn with_folders<'a>(self, folders: impl IntoIterator<Item = &'a FolderRef>) -> Self {
        folders.into_iter().fold(self, Self::with_folder)
    }

    pub fn failing(mut self, call: Call) -> Self {
        self.failing_calls.insert(call);
        self
    }

    pub fn failing_resolution(mut self, folder: &FolderRef) -> Self {
        self.failing_resolutions.insert(folder.id());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls without the account name lookups.
    pub fn operations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::GetAccountName(_)))
            .collect()
    }

    fn record(&self, call: Call) -> std::result::Result<(), StoreError> {
        self.calls.lock().unwrap().push(call.clone());

        if self.failing_calls.contains(&call) {
            Err(StoreError::Status(0x8000_4005))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MailboxBackend for MockBackend {
    async fn empty_junk(&self, folder: &FolderRef) -> Result<()> {
        self.record(Call::EmptyJunk(folder.id()))
            .map_err(|err| Error::EmptyJunkError(err, folder.id()))
    }

    async fn empty_trash(&self, folder: &FolderRef) -> Result<()> {
        self.record(Call::EmptyTrash(folder.id()))
            .map_err(|err| Error::EmptyTrashError(err, folder.id()))
    }

    async fn compact(&self, folder: &FolderRef) -> Result<()> {
        self.record(Call::Compact(folder.id()))
            .map_err(|err| Error::compact_folder(err, folder.id()))
    }

    async fn get_account_name(&self, account_id: &str) -> Result<Option<String>> {
        self.record(Call::GetAccountName(account_id.to_owned()))
            .map_err(|err| Error::GetAccountError(err, account_id.to_owned()))?;
        Ok(self.accounts.get(account_id).cloned())
    }

    async fn resolve_folder(&self, id: &str) -> Result<Option<FolderRef>> {
        if self.failing_resolutions.contains(id) {
            let err = StoreError::from("folder is inaccessible");
            return Err(Error::ResolveFolderError(err, id.to_owned()));
        }
        Ok(self.folders.get(id).cloned())
    }
}

/// Prompt answering with a fixed answer, keeping track of questions.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answer: bool,
    fail: bool,
    asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedPrompt {
    pub fn accepting() -> Self {
        Self {
            answer: true,
            ..Default::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            answer: true,
            fail: true,
            ..Default::default()
        }
    }

    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, title: &str, message: &str) -> Result<bool> {
        self.asked
            .lock()
            .unwrap()
            .push((title.to_owned(), message.to_owned()));

        if self.fail {
            return Err(Error::ConfirmError(StoreError::from("no window")));
        }

        Ok(self.answer)
    }
}

/// Clock stuck at a given local time.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Local>>);

impl FixedClock {
    /// Build a clock set on a winter day at the given time.
    pub fn at(hours: u32, minutes: u32) -> Self {
        let time = Local
            .with_ymd_and_hms(2024, 1, 15, hours, minutes, 0)
            .unwrap();
        Self(Mutex::new(time))
    }

    pub fn set(&self, hours: u32, minutes: u32) {
        *self.0.lock().unwrap() = Self::at(hours, minutes).now();
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.0.lock().unwrap() += Duration::minutes(minutes);
    }

    pub fn millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Epoch milliseconds of the given amount of minutes ago.
    pub fn minutes_ago(&self, minutes: i64) -> i64 {
        self.millis() - minutes * 60_000
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

pub struct Setup {
    pub backend: Arc<MockBackend>,
    pub store: Arc<MemoryPreferenceStore>,
    pub prompt: Arc<ScriptedPrompt>,
    pub clock: Arc<FixedClock>,
    pub xpunge: Xpunge,
}

pub fn setup(backend: MockBackend, prompt: ScriptedPrompt) -> Setup {
    setup_with_clock(backend, prompt, FixedClock::at(12, 0))
}

pub fn setup_with_clock(backend: MockBackend, prompt: ScriptedPrompt, clock: FixedClock) -> Setup {
    let backend = Arc::new(backend);
    let store = Arc::new(MemoryPreferenceStore::new());
    let prompt = Arc::new(prompt);
    let clock = Arc::new(clock);

    let xpunge = Xpunge::new(backend.clone(), store.clone(), prompt.clone())
        .with_clock(clock.clone());

    Setup {
        backend,
        store,
        prompt,
        clock,
        xpunge,
    }
}

pub fn root(account_id: &str) -> FolderRef {
    FolderRef::root(account_id)
}

pub fn folder(account_id: &str, name: &str) -> FolderRef {
    FolderRef::new(account_id, format!("/{name}"), name)
}
