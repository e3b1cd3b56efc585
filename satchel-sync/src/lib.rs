//! # satchel-sync
//!
//! Attachment directory resolution and list synchronization.
//!
//! Build an [`Attachments`] engine over any [`satchel_core::TaskStore`] and
//! call [`Attachments::attach`], [`Attachments::create_new`],
//! [`Attachments::delete_all`] or [`Attachments::sync_from_disk`].

pub mod engine;
pub mod error;
pub mod paths;
pub mod vcs;

pub use engine::{AttachOutcome, Attachments, DirectoryVisitor, EditBuffer};
pub use error::AttachError;
pub use vcs::{GitNotifier, NoopNotifier, Notifier, NotifyOutcome};
