//! # Batch
//!
//! Module dedicated to the batch executor. A [`Batch`] is made of
//! three ordered folder lists: junk folders to empty, trash folders
//! to empty and folders to compact. Phases always run in this order,
//! targets of a phase always run sequentially in list order.
//!
//! Every target is its own failure domain: a failure is logged then
//! the executor moves on to the next target.

use tracing::{info, warn};

use crate::{backend::MailboxBackend, folder::FolderRef, Error};

/// The batch of folders to process.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Batch {
    pub junk: Vec<FolderRef>,
    pub trash: Vec<FolderRef>,
    pub compact: Vec<FolderRef>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.junk.is_empty() && self.trash.is_empty() && self.compact.is_empty()
    }
}

/// The report of one batch phase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PhaseReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl PhaseReport {
    fn record<T>(&mut self, res: &Result<T, Error>) {
        if res.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// The report of a whole batch.
///
/// Informational only: failures have already been logged.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchReport {
    pub junk: PhaseReport,
    pub trash: PhaseReport,
    pub compact: PhaseReport,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.junk.failed + self.trash.failed + self.compact.failed
    }

    pub fn succeeded(&self) -> usize {
        self.junk.succeeded + self.trash.succeeded + self.compact.succeeded
    }
}

/// The outcome of an orchestrated run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Nothing was done because the input was not eligible.
    Skipped,

    /// Nothing was done because the user did not confirm.
    Declined,

    /// The run went through, possibly with failed targets.
    Done(BatchReport),
}

/// Run the given batch against the given backend.
pub async fn run(backend: &dyn MailboxBackend, batch: &Batch) -> BatchReport {
    let mut report = BatchReport::default();

    for folder in &batch.junk {
        let res = backend.empty_junk(folder).await;
        if let Err(err) = &res {
            warn!(folder = %folder, "cannot empty junk folder: {err}");
        }
        report.junk.record(&res);
    }

    for folder in &batch.trash {
        let res = backend.empty_trash(folder).await;
        if let Err(err) = &res {
            warn!(folder = %folder, "cannot empty trash folder: {err}");
        }
        report.trash.record(&res);
    }

    for folder in &batch.compact {
        let res = backend.compact(folder).await;
        if let Err(err) = &res {
            warn!(folder = %folder, "cannot compact folder: {err}");
            info!("{}", compact_failure_message(backend, folder).await);
        }
        report.compact.record(&res);
    }

    report
}

/// Build the friendly message explaining a compaction failure.
///
/// Never fails: if the account cannot be identified, a generic
/// message is returned instead.
pub(crate) async fn compact_failure_message(
    backend: &dyn MailboxBackend,
    folder: &FolderRef,
) -> String {
    match backend.get_account_name(&folder.account_id).await {
        Ok(name) => {
            let name = name.unwrap_or_else(|| unknown_account(&folder.account_id));
            if folder.is_root {
                format!("Failed to compact all folders for account: {name}.")
            } else {
                format!("Failed to compact folder on account: {name}.")
            }
        }
        Err(err) => {
            warn!(account = folder.account_id, "cannot get account name: {err}");
            String::from("Failed to compact folder - unable to identify account.")
        }
    }
}

pub(crate) fn unknown_account(account_id: &str) -> String {
    format!("{account_id} - UNKNOWN")
}
