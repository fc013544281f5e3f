//! # Account
//!
//! Module dedicated to the single account xpunge: empty junk, empty
//! trash and compact one whole account, depending on preferences.

use tracing::{debug, info, warn};

use crate::{
    batch::{unknown_account, BatchReport, Outcome},
    folder::FolderRef,
    prompt::MessageKey,
    Result, Xpunge,
};

impl Xpunge {
    /// Xpunge the account of the given root folder.
    ///
    /// Non-root folders are ignored. Only preference or store access
    /// failures are returned, backend failures are logged.
    pub async fn xpunge_account(&self, folder: &FolderRef) -> Result<Outcome> {
        if !folder.is_root {
            debug!(folder = %folder, "not a root folder, skipping account xpunge");
            return Ok(Outcome::Skipped);
        }

        let prefs = self.preferences.get_all().await?;

        if prefs.confirm_single_action {
            let account_name = match self.backend.get_account_name(&folder.account_id).await {
                Ok(Some(name)) => name,
                Ok(None) => unknown_account(&folder.account_id),
                Err(err) => {
                    warn!(account = folder.account_id, "cannot get account name: {err}");
                    unknown_account(&folder.account_id)
                }
            };

            let title = self.prompt.message(MessageKey::SingleConfirmTitle, &[]);
            let body = self.prompt.message(
                MessageKey::SingleConfirmBody,
                &[
                    account_name,
                    self.prompt.yes_or_no(prefs.empty_trash),
                    self.prompt.yes_or_no(prefs.empty_junk),
                    self.prompt.yes_or_no(prefs.compact_folders),
                ],
            );

            if !self.confirm(&title, &body).await {
                info!(account = folder.account_id, "account xpunge declined");
                return Ok(Outcome::Declined);
            }
        }

        info!(account = folder.account_id, "xpunging account");

        let mut report = BatchReport::default();

        if prefs.empty_junk {
            match self.backend.empty_junk(folder).await {
                Ok(()) => report.junk.succeeded += 1,
                Err(err) => {
                    warn!(account = folder.account_id, "cannot empty junk: {err}");
                    report.junk.failed += 1;
                }
            }
        }

        if prefs.empty_trash {
            match self.backend.empty_trash(folder).await {
                Ok(()) => report.trash.succeeded += 1,
                Err(err) => {
                    warn!(account = folder.account_id, "cannot empty trash: {err}");
                    report.trash.failed += 1;
                }
            }
        }

        if prefs.compact_folders {
            match self.backend.compact(folder).await {
                Ok(()) => report.compact.succeeded += 1,
                Err(err) => {
                    warn!(account = folder.account_id, "cannot compact folders: {err}");
                    info!("{}", self.compact_account_failure_message(folder).await);
                    report.compact.failed += 1;
                }
            }
        }

        Ok(Outcome::Done(report))
    }

    /// Build the friendly message explaining an account compaction
    /// failure. Never fails.
    async fn compact_account_failure_message(&self, folder: &FolderRef) -> String {
        match self.backend.get_account_name(&folder.account_id).await {
            Ok(name) => {
                let name = name.unwrap_or_else(|| unknown_account(&folder.account_id));
                format!(
                    "Failed to compact folders for account: {name}. \
                     Please ensure the account is properly connected and try again."
                )
            }
            Err(err) => {
                warn!(account = folder.account_id, "cannot get account name: {err}");
                String::from("Failed to compact folders - unable to identify account.")
            }
        }
    }
}
