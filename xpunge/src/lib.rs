#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
//! Asynchronous library to keep mailboxes tidy.
//!
//! The library empties junk folders, empties trash folders and
//! compacts mailboxes, for one account at a time or for several
//! user-selected folders at once. It can also run on a timer, either
//! at a fixed time of day or at a fixed interval.
//!
//! Heavy lifting is delegated to the host mail client, reached
//! through three collaborators:
//!
//! 1. A [`MailboxBackend`](crate::backend::MailboxBackend), which
//! empties and compacts folders. The
//! [`NativeBackend`](crate::backend::native::NativeBackend) builds
//! one on top of the host native folder system.
//!
//! 2. A [`PreferenceStore`](crate::preferences::PreferenceStore),
//! which persists preferences and timer bookkeeping.
//!
//! 3. A [`UserPrompt`](crate::prompt::UserPrompt), which asks for
//! confirmation before running.
//!
//! All of them are gathered in the [`Xpunge`] context, which exposes
//! the three entry points: [`Xpunge::xpunge_account`],
//! [`Xpunge::xpunge_multiple`] and [`Xpunge::handle_timer`].
//!
//! Housekeeping is best effort: a failing folder is logged and never
//! prevents the other folders from being processed.

pub mod account;
pub mod backend;
pub mod batch;
pub mod clock;
mod context;
mod error;
pub mod folder;
pub mod multiple;
pub mod preferences;
pub mod prompt;
pub mod timer;

#[doc(inline)]
pub use self::{
    context::Xpunge,
    error::{Error, Result, StoreError, FOLDER_NOT_REFRESHED_STATUS},
    folder::FolderRef,
};
