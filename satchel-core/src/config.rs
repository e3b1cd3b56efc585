//! User configuration at `~/.satchel/config.yaml`.
//!
//! Every field is optional; a missing file means all defaults. As with the
//! outline helpers, `load_at(home)` takes an explicit home and `load()`
//! derives it from `dirs::home_dir()`. Tests only ever call `load_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{AttachMethod, VcsMode};

/// Storage root used when nothing else is configured.
pub const DEFAULT_STORAGE_ROOT: &str = "data/";
/// Tag applied to tasks that carry attachments.
pub const DEFAULT_AUTO_TAG: &str = "ATTACH";
/// Files at or above this size go through `git annex add` when annex is set up.
pub const DEFAULT_ANNEX_CUTOFF: u64 = 32 * 1024 * 1024;

/// Parsed `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Attachment storage root; relative values resolve against the outline's directory.
    pub storage_root: PathBuf,
    pub method: AttachMethod,
    /// `null` disables tagging.
    pub auto_tag: Option<String>,
    pub vcs: VcsMode,
    /// `null` disables git-annex handling.
    pub annex_cutoff: Option<u64>,
    /// Program used to reveal a directory; platform opener when unset.
    pub open_command: Option<String>,
    /// Program used for new attachments; `$VISUAL`/`$EDITOR` when unset.
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            method: AttachMethod::default(),
            auto_tag: Some(DEFAULT_AUTO_TAG.to_string()),
            vcs: VcsMode::default(),
            annex_cutoff: Some(DEFAULT_ANNEX_CUTOFF),
            open_command: None,
            editor: None,
        }
    }
}

impl Config {
    /// Storage settings for an outline living in `base_dir`.
    pub fn storage(&self, base_dir: impl Into<PathBuf>) -> StorageConfig {
        StorageConfig {
            root: self.storage_root.clone(),
            base_dir: base_dir.into(),
        }
    }
}

/// Where attachment directories live. Read by every operation; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub base_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(root: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Storage root as an absolute path (relative roots join `base_dir`).
    pub fn absolute_root(&self) -> PathBuf {
        let joined = if self.root.is_absolute() {
            self.root.clone()
        } else {
            self.base_dir.join(&self.root)
        };
        if joined.is_absolute() {
            return joined;
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(joined),
            Err(_) => joined,
        }
    }
}

/// `<home>/.satchel/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".satchel").join("config.yaml")
}

/// Load the config under `home`, falling back to defaults when absent.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(home: &TempDir, yaml: &str) {
        let path = config_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, yaml).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().unwrap();
        let cfg = load_at(home.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.storage_root, PathBuf::from("data/"));
        assert_eq!(cfg.auto_tag.as_deref(), Some("ATTACH"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let home = TempDir::new().unwrap();
        write_config(&home, "storage_root: /srv/attach\nmethod: copy\n");
        let cfg = load_at(home.path()).unwrap();
        assert_eq!(cfg.storage_root, PathBuf::from("/srv/attach"));
        assert_eq!(cfg.method, AttachMethod::Copy);
        assert_eq!(cfg.vcs, VcsMode::Auto);
        assert_eq!(cfg.annex_cutoff, Some(DEFAULT_ANNEX_CUTOFF));
    }

    #[test]
    fn null_disables_optional_features() {
        let home = TempDir::new().unwrap();
        write_config(&home, "auto_tag: null\nannex_cutoff: null\nvcs: \"off\"\n");
        let cfg = load_at(home.path()).unwrap();
        assert!(cfg.auto_tag.is_none());
        assert!(cfg.annex_cutoff.is_none());
        assert_eq!(cfg.vcs, VcsMode::Off);
    }

    #[test]
    fn malformed_config_reports_path() {
        let home = TempDir::new().unwrap();
        write_config(&home, "method: teleport\n");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn relative_root_resolves_against_base_dir() {
        let storage = StorageConfig::new("data/", "/notes");
        assert_eq!(storage.absolute_root(), PathBuf::from("/notes/data/"));
    }

    #[test]
    fn absolute_root_ignores_base_dir() {
        let storage = StorageConfig::new("/srv/attach", "/notes");
        assert_eq!(storage.absolute_root(), PathBuf::from("/srv/attach"));
    }
}
