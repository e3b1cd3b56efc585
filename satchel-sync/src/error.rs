//! Error types for satchel-sync.

use std::path::PathBuf;

use thiserror::Error;

use satchel_core::OutlineError;

/// All errors that can arise from attachment operations.
///
/// Version-control failures never appear here; the notifier logs and drops them.
#[derive(Debug, Error)]
pub enum AttachError {
    /// The file handed to `attach` does not exist or cannot be read.
    #[error("source file not found or unreadable: {path}")]
    SourceNotFound { path: PathBuf },

    /// The filesystem refused to create the attachment directory.
    #[error("cannot create attachment directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving (or copying/linking) the source into place failed.
    #[error("cannot move {from} to {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task identifier cannot be split into two safe path segments.
    #[error("identifier '{id}' cannot be used as an attachment path")]
    InvalidIdentifier { id: String },

    /// An attachment name that is not a plain file name, or a file on disk
    /// whose name is not UTF-8.
    #[error("'{name}' is not a valid attachment file name")]
    InvalidName { name: String },

    #[error("no attachment named '{name}' in {dir}")]
    AttachmentNotFound { name: String, dir: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A visitor or editor collaborator reported failure.
    #[error("{0}")]
    Collaborator(String),

    #[error("outline error: {0}")]
    Outline(#[from] OutlineError),
}

/// Convenience constructor for [`AttachError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AttachError {
    AttachError::Io {
        path: path.into(),
        source,
    }
}
