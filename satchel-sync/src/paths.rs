//! Identifier → attachment directory resolution.
//!
//! ```text
//! <storage_root>/
//!   3f/
//!     2a9c1b-5d0e-4c4b-9a51-0c8e8d1e2f77/   (one directory per task)
//! ```
//!
//! The first two characters of the identifier name a fan-out directory so no
//! single directory collects every task. Uniqueness comes from the identifier
//! itself, not from the split.

use std::path::{Path, PathBuf};

use satchel_core::{IdentifierProvider, StorageConfig, TaskId, TaskRef};

use crate::error::AttachError;

/// Number of identifier characters used for the fan-out directory.
pub const FANOUT_PREFIX: usize = 2;

/// `root/id[0:2]/id[2:]`. Pure, no I/O.
///
/// Rejects identifiers that are too short to split or that would escape the
/// root (separators, leading dots).
pub fn attachment_dir(root: &Path, id: &TaskId) -> Result<PathBuf, AttachError> {
    let (prefix, rest) = split_identifier(id)?;
    Ok(root.join(prefix).join(rest))
}

fn split_identifier(id: &TaskId) -> Result<(&str, &str), AttachError> {
    let invalid = || AttachError::InvalidIdentifier { id: id.0.clone() };
    let s = id.as_str();
    let (at, _) = s.char_indices().nth(FANOUT_PREFIX).ok_or_else(invalid)?;
    let (prefix, rest) = s.split_at(at);
    let unsafe_segment =
        |seg: &str| seg.starts_with('.') || seg.contains(['/', '\\', '\0']);
    if unsafe_segment(prefix) || unsafe_segment(rest) {
        return Err(invalid());
    }
    Ok((prefix, rest))
}

/// Resolve the attachment directory of `task`.
///
/// - no identifier and `create == false` → `None`, nothing touched.
/// - no identifier and `create == true` → a new identifier is assigned first.
/// - `create == true` creates the directory (and parents) if missing.
///
/// Returns the path only if the directory exists once the above is done.
pub fn resolve<P>(
    provider: &mut P,
    task: &TaskRef,
    storage: &StorageConfig,
    create: bool,
) -> Result<Option<PathBuf>, AttachError>
where
    P: IdentifierProvider + ?Sized,
{
    let Some(id) = provider.identifier(task, create)? else {
        tracing::debug!(task = %task, "no identifier; no attachment directory");
        return Ok(None);
    };

    let dir = attachment_dir(&storage.absolute_root(), &id)?;
    if create && !dir.is_dir() {
        std::fs::create_dir_all(&dir).map_err(|e| AttachError::DirectoryCreateFailed {
            path: dir.clone(),
            source: e,
        })?;
        tracing::info!(task = %task, dir = %dir.display(), "created attachment directory");
    }

    if dir.is_dir() {
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
