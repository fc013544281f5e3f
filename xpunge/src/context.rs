//! # Context
//!
//! The [`Xpunge`] context gathers the collaborators every entry
//! point needs: the mailbox backend, the preferences, the user
//! prompt and the clock. Entry points are implemented in their own
//! modules: [`crate::account`], [`crate::multiple`] and
//! [`crate::timer`].

use std::sync::Arc;

use crate::{
    backend::MailboxBackend,
    clock::{Clock, SystemClock},
    preferences::{PreferenceAdapter, PreferenceStore},
    prompt::UserPrompt,
};

#[derive(Clone)]
pub struct Xpunge {
    pub(crate) backend: Arc<dyn MailboxBackend>,
    pub(crate) preferences: PreferenceAdapter,
    pub(crate) prompt: Arc<dyn UserPrompt>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Xpunge {
    pub fn new(
        backend: Arc<dyn MailboxBackend>,
        store: Arc<dyn PreferenceStore>,
        prompt: Arc<dyn UserPrompt>,
    ) -> Self {
        Self {
            preferences: PreferenceAdapter::new(store, backend.clone()),
            backend,
            prompt,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend(&self) -> &Arc<dyn MailboxBackend> {
        &self.backend
    }

    pub fn preferences(&self) -> &PreferenceAdapter {
        &self.preferences
    }

    /// Ask the user for confirmation.
    ///
    /// A prompt failure counts as a refusal.
    pub(crate) async fn confirm(&self, title: &str, message: &str) -> bool {
        match self.prompt.confirm(title, message).await {
            Ok(confirmed) => confirmed,
            Err(err) => {
                tracing::warn!("cannot ask for confirmation, aborting: {err}");
                false
            }
        }
    }
}
