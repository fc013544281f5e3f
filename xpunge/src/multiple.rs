//! # Multiple
//!
//! Module dedicated to the multi xpunge: run the batch executor on
//! the junk, trash and compact lists configured by the user.

use tracing::{info, warn};

use crate::{
    backend::MailboxBackend,
    batch::{self, Batch, Outcome},
    prompt::{MessageKey, UserPrompt},
    FolderRef, Result, Xpunge,
};

impl Xpunge {
    /// Xpunge all the folders configured for multi xpunge.
    pub async fn xpunge_multiple(&self) -> Result<Outcome> {
        let prefs = self.preferences.get_all().await?;

        let batch = Batch {
            junk: prefs.multi_junk_accounts,
            trash: prefs.multi_trash_accounts,
            compact: prefs.multi_compact_folders,
        };

        if prefs.confirm_multi_action {
            let backend = self.backend.as_ref();
            let prompt = self.prompt.as_ref();

            let title = prompt.message(MessageKey::MultiConfirmTitle, &[]);
            let body = prompt.message(
                MessageKey::MultiConfirmBody,
                &[
                    pretty_print_folders(backend, prompt, &batch.trash, false).await,
                    pretty_print_folders(backend, prompt, &batch.junk, false).await,
                    pretty_print_folders(backend, prompt, &batch.compact, true).await,
                ],
            );

            if !self.confirm(&title, &body).await {
                info!("multi xpunge declined");
                return Ok(Outcome::Declined);
            }
        }

        info!(
            junk = batch.junk.len(),
            trash = batch.trash.len(),
            compact = batch.compact.len(),
            "running multi xpunge"
        );

        Ok(Outcome::Done(batch::run(self.backend.as_ref(), &batch).await))
    }
}

/// Render the given folder list for a confirmation dialog.
///
/// Returns an empty string for an empty list, otherwise a newline
/// followed by one line per folder: the account name for root
/// folders, `folder @ account` for other ones. Folders whose account
/// cannot be found are left out.
pub async fn pretty_print_folders(
    backend: &dyn MailboxBackend,
    prompt: &dyn UserPrompt,
    folders: &[FolderRef],
    for_compacting: bool,
) -> String {
    if folders.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(folders.len());

    for folder in folders {
        let account = match backend.get_account_name(&folder.account_id).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                warn!(
                    account = folder.account_id,
                    for_compacting,
                    "cannot find account while pretty printing folder"
                );
                continue;
            }
            Err(err) => {
                warn!(
                    account = folder.account_id,
                    for_compacting,
                    "cannot pretty print folder: {err}"
                );
                continue;
            }
        };

        let line = match (folder.is_root, for_compacting) {
            (true, true) => {
                let whole = prompt.message(MessageKey::CompactWholeAccount, &[]);
                format!(" - {account} {whole}")
            }
            (true, false) => format!(" - {account}"),
            (false, _) => format!(" - {} @ {account}", folder.name),
        };

        lines.push(line);
    }

    format!("\n{}", lines.join("\n"))
}
