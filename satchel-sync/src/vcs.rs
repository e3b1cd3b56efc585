//! Version-control notifier.
//!
//! After a mutating operation the storage root is committed if it is a git
//! repository (a `.git` entry directly under the root). The notifier never
//! fails its caller: every problem is logged at `warn` and dropped, so
//! attachment operations behave the same with or without git.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use satchel_core::{Config, StorageConfig, VcsMode};

/// Marker entry that turns commits on.
pub const VCS_MARKER: &str = ".git";
/// Message of every attachment commit.
pub const COMMIT_MESSAGE: &str = "Synchronized attachments";

/// What a notification did. Informational only; never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No `.git` marker under the storage root (or notifications disabled).
    NotTracked,
    /// Repository had nothing to commit.
    Clean,
    Committed,
    /// A git step failed; already logged.
    Failed,
}

/// Records changes to the storage root after attachment mutations.
pub trait Notifier {
    fn notify(&self, storage: &StorageConfig) -> NotifyOutcome;
}

/// Does nothing. Used when `vcs: off`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _storage: &StorageConfig) -> NotifyOutcome {
        NotifyOutcome::NotTracked
    }
}

/// Commits the storage root with the `git` binary.
#[derive(Debug, Clone)]
pub struct GitNotifier {
    /// Files at or above this size are added through git-annex when the
    /// repository has an annex.
    pub annex_cutoff: Option<u64>,
    pub message: String,
}

impl Default for GitNotifier {
    fn default() -> Self {
        Self {
            annex_cutoff: None,
            message: COMMIT_MESSAGE.to_string(),
        }
    }
}

impl GitNotifier {
    pub fn with_annex_cutoff(mut self, cutoff: Option<u64>) -> Self {
        self.annex_cutoff = cutoff;
        self
    }

    fn commit(&self, root: &Path) -> Result<NotifyOutcome, String> {
        let git = Git::new(root);

        if let Some(cutoff) = self.annex_cutoff {
            if root.join(VCS_MARKER).join("annex").exists() {
                git.annex_large_files(cutoff)?;
            }
        }

        // Stages new, modified and deleted files in one pass.
        git.run_checked(&["add", "--all", "--", "."])?;

        if !git.has_staged_changes()? {
            return Ok(NotifyOutcome::Clean);
        }
        git.run_checked(&["commit", "--quiet", "--no-verify", "-m", &self.message])?;
        Ok(NotifyOutcome::Committed)
    }
}

impl Notifier for GitNotifier {
    fn notify(&self, storage: &StorageConfig) -> NotifyOutcome {
        let root = storage.absolute_root();
        if !root.join(VCS_MARKER).exists() {
            tracing::debug!(root = %root.display(), "storage root not under version control");
            return NotifyOutcome::NotTracked;
        }
        match self.commit(&root) {
            Ok(outcome) => {
                tracing::info!(root = %root.display(), ?outcome, "attachment commit");
                outcome
            }
            Err(msg) => {
                tracing::warn!(root = %root.display(), "attachment commit failed: {msg}");
                NotifyOutcome::Failed
            }
        }
    }
}

/// Notifier selected by the user's configuration.
pub fn notifier_for(config: &Config) -> Box<dyn Notifier> {
    match config.vcs {
        VcsMode::Auto => Box::new(GitNotifier::default().with_annex_cutoff(config.annex_cutoff)),
        VcsMode::Off => Box::new(NoopNotifier),
    }
}

// ---------------------------------------------------------------------------
// git subprocess wrapper
// ---------------------------------------------------------------------------

struct Git {
    workdir: PathBuf,
}

impl Git {
    fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, String> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| format!("cannot run git {}: {e}", args.join(" ")))
    }

    fn run_checked(&self, args: &[&str]) -> Result<String, String> {
        let out = self.run(args)?;
        if !out.status.success() {
            return Err(format!(
                "git {} exited with {}: {}",
                args.join(" "),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    /// `git diff --cached --quiet` exits 1 when something is staged.
    fn has_staged_changes(&self) -> Result<bool, String> {
        let out = self.run(&["diff", "--cached", "--quiet"])?;
        match out.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!(
                "git diff --cached failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )),
        }
    }

    /// Hand new or modified files of at least `cutoff` bytes to git-annex.
    fn annex_large_files(&self, cutoff: u64) -> Result<(), String> {
        let listing = self.run_checked(&["ls-files", "-z", "-m", "-o", "--exclude-standard"])?;
        for file in listing.split('\0').filter(|f| !f.is_empty()) {
            let size = std::fs::metadata(self.workdir.join(file))
                .map(|m| m.len())
                .unwrap_or(0);
            if size >= cutoff {
                self.run_checked(&["annex", "add", "--", file])?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
