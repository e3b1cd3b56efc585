//! YAML outline persistence.
//!
//! An outline is a single YAML document holding every task, its identifier
//! and its attachment list:
//!
//! ```text
//! version: 1
//! tasks:
//!   - title: Quarterly report
//!     id: 3f2a9c1b-5d0e-4c4b-9a51-0c8e8d1e2f77
//!     attachments: [report.pdf]
//!     tags: [ATTACH]
//! ```
//!
//! Saves are atomic: serialize → `<name>.tmp` sibling → `chmod 0600` → `rename`.

use std::path::{Path, PathBuf};

use crate::error::OutlineError;
use crate::types::Outline;

/// Default outline file name, relative to the working directory.
pub const DEFAULT_OUTLINE: &str = "outline.yaml";

/// Load an outline from `path`.
///
/// Returns `OutlineError::OutlineNotFound` if absent,
/// `OutlineError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Outline, OutlineError> {
    if !path.exists() {
        return Err(OutlineError::OutlineNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| OutlineError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load an outline, or start an empty one if the file does not exist yet.
pub fn load_or_default(path: &Path) -> Result<Outline, OutlineError> {
    match load_at(path) {
        Err(OutlineError::OutlineNotFound { .. }) => Ok(Outline::default()),
        other => other,
    }
}

/// Atomically save `outline` to `path`.
///
/// The `.tmp` sibling lives next to the target so the rename never crosses filesystems.
pub fn save_at(path: &Path, outline: &Outline) -> Result<(), OutlineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = tmp_path_for(path);

    let yaml = serde_yaml::to_string(outline)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// `<path>.tmp` next to the outline.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_OUTLINE.into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Directory relative storage roots are resolved against: the outline's parent.
pub fn base_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), OutlineError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), OutlineError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
