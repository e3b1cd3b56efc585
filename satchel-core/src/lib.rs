//! Satchel core library — domain types, outline persistence, configuration,
//! and the collaborator traits the attachment engine depends on.
//!
//! - [`types`] — newtypes and domain structs
//! - [`store`] — [`IdentifierProvider`], [`AttachmentListStore`], [`TagStore`]
//! - [`outline`] — load / save of YAML outlines
//! - [`config`] — `~/.satchel/config.yaml`
//! - [`error`] — [`OutlineError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod outline;
pub mod store;
pub mod types;

pub use config::{Config, StorageConfig};
pub use error::{ConfigError, OutlineError};
pub use store::{AttachmentListStore, IdentifierProvider, TagStore, TaskStore};
pub use types::{AttachMethod, Outline, Task, TaskId, TaskRef, VcsMode};
