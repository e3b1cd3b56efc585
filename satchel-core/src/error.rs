//! Error types for satchel-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from outline operations.
#[derive(Debug, Error)]
pub enum OutlineError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path and serde_yaml line context.
    #[error("failed to parse outline at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The outline YAML file did not exist at the expected path.
    #[error("outline not found at {path}")]
    OutlineNotFound { path: PathBuf },

    /// No task with this title exists in the outline.
    #[error("no task titled '{title}' in outline")]
    TaskNotFound { title: String },

    /// A task with this title already exists.
    #[error("a task titled '{title}' already exists")]
    DuplicateTask { title: String },

    /// Identifiers are immutable once assigned.
    #[error("task '{title}' already has identifier {existing}")]
    IdentifierConflict { title: String, existing: String },
}

/// Errors from loading `~/.satchel/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.satchel/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
