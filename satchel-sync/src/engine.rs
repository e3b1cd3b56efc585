//! Attachment engine: attach, create, delete-all and sync-from-disk.
//!
//! ## Ordering
//!
//! Every write-capable operation finishes its disk work (directory creation,
//! file transfer) before it touches the attachment list, so a failed mkdir or
//! move never leaves a list entry without a file behind it.
//!
//! `sync_from_disk` notifies version control *before* rebuilding the list so
//! the commit records whatever changed out of band since the last sync.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use satchel_core::{AttachMethod, Config, StorageConfig, TaskRef, TaskStore};

use crate::error::{io_err, AttachError};
use crate::paths;
use crate::vcs::{notifier_for, GitNotifier, Notifier};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Receives an attachment directory after `attach` or `reveal`
/// (a file manager, a shell, a terminal printout).
pub trait DirectoryVisitor {
    fn visit(&mut self, dir: &Path) -> Result<(), AttachError>;
}

/// Opens the target of `create_new` for editing. The file itself comes into
/// existence when the editor saves it.
pub trait EditBuffer {
    fn edit(&mut self, path: &Path) -> Result<(), AttachError>;
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of [`Attachments::attach`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// File is in place; the caller reports success.
    Attached { dir: PathBuf, file: PathBuf },
    /// File is in place and the directory was handed to the visitor.
    Visited { dir: PathBuf, file: PathBuf },
}

impl AttachOutcome {
    pub fn file(&self) -> &Path {
        match self {
            AttachOutcome::Attached { file, .. } | AttachOutcome::Visited { file, .. } => file,
        }
    }

    pub fn dir(&self) -> &Path {
        match self {
            AttachOutcome::Attached { dir, .. } | AttachOutcome::Visited { dir, .. } => dir,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Attachment operations over a task store.
pub struct Attachments<'a, S: TaskStore + ?Sized> {
    store: &'a mut S,
    storage: StorageConfig,
    notifier: Box<dyn Notifier>,
    method: AttachMethod,
    auto_tag: Option<String>,
}

impl<'a, S: TaskStore + ?Sized> Attachments<'a, S> {
    /// Engine with default behaviour: move, no tagging, git commits.
    pub fn new(store: &'a mut S, storage: StorageConfig) -> Self {
        Self {
            store,
            storage,
            notifier: Box::new(GitNotifier::default()),
            method: AttachMethod::Move,
            auto_tag: None,
        }
    }

    /// Engine configured from `config.yaml` for an outline living in `base_dir`.
    pub fn from_config(store: &'a mut S, config: &Config, base_dir: &Path) -> Self {
        Self {
            store,
            storage: config.storage(base_dir),
            notifier: notifier_for(config),
            method: config.method,
            auto_tag: config.auto_tag.clone(),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_method(mut self, method: AttachMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_auto_tag(mut self, tag: Option<String>) -> Self {
        self.auto_tag = tag;
        self
    }

    /// Attachment directory of `task`, creating it (and an identifier) if asked.
    pub fn resolve(&mut self, task: &TaskRef, create: bool) -> Result<Option<PathBuf>, AttachError> {
        paths::resolve(&mut *self.store, task, &self.storage, create)
    }

    // -----------------------------------------------------------------------
    // attach
    // -----------------------------------------------------------------------

    /// Transfer `source` into the task's attachment directory.
    ///
    /// An existing attachment with the same name is overwritten. The name is
    /// appended to the list even if it is already there.
    pub fn attach(
        &mut self,
        task: &TaskRef,
        source: &Path,
        visitor: Option<&mut dyn DirectoryVisitor>,
    ) -> Result<AttachOutcome, AttachError> {
        let source_missing = || AttachError::SourceNotFound {
            path: source.to_path_buf(),
        };
        let readable = fs::metadata(source).map(|m| m.is_file()).unwrap_or(false)
            && fs::File::open(source).is_ok();
        if !readable {
            return Err(source_missing());
        }
        let basename = source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(source_missing)?;

        let dir = self.require_dir(task)?;
        let file = dir.join(&basename);
        transfer(self.method, source, &file)?;

        self.store.append_attachment(task, &basename)?;
        self.apply_tag(task, true)?;
        tracing::info!(
            task = %task,
            method = %self.method,
            "attached {} as {}",
            source.display(),
            file.display()
        );
        self.notifier.notify(&self.storage);

        match visitor {
            Some(visitor) => {
                visitor.visit(&dir)?;
                Ok(AttachOutcome::Visited { dir, file })
            }
            None => Ok(AttachOutcome::Attached { dir, file }),
        }
    }

    // -----------------------------------------------------------------------
    // create_new
    // -----------------------------------------------------------------------

    /// Register `name` as a new attachment and hand its path to `editor`.
    ///
    /// Nothing is written to disk here besides the directory itself.
    pub fn create_new(
        &mut self,
        task: &TaskRef,
        name: &str,
        editor: &mut dyn EditBuffer,
    ) -> Result<PathBuf, AttachError> {
        validate_name(name)?;
        let dir = self.require_dir(task)?;
        self.store.append_attachment(task, name)?;
        self.apply_tag(task, true)?;

        let path = dir.join(name);
        tracing::info!(task = %task, path = %path.display(), "new attachment");
        editor.edit(&path)?;
        Ok(path)
    }

    // -----------------------------------------------------------------------
    // delete_all
    // -----------------------------------------------------------------------

    /// Clear the list and remove the attachment directory with everything in it.
    ///
    /// Idempotent. Returns whether a directory was removed.
    pub fn delete_all(&mut self, task: &TaskRef) -> Result<bool, AttachError> {
        self.store.clear_attachments(task)?;
        self.apply_tag(task, false)?;

        let removed = match self.resolve(task, false)? {
            Some(dir) => {
                match fs::remove_dir_all(&dir) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(io_err(&dir, e)),
                }
                // Drop the fan-out directory once its last task is gone.
                if let Some(parent) = dir.parent() {
                    let _ = fs::remove_dir(parent);
                }
                tracing::info!(task = %task, dir = %dir.display(), "deleted all attachments");
                true
            }
            None => false,
        };

        self.notifier.notify(&self.storage);
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // sync_from_disk
    // -----------------------------------------------------------------------

    /// Rebuild the attachment list from the directory contents.
    ///
    /// Hidden entries (leading `.`) are skipped; the rest keep directory
    /// enumeration order. A task without a directory ends with an empty list
    /// and no identifier is allocated. A file name that is not UTF-8 fails with
    /// [`AttachError::InvalidName`] and leaves the list as it was.
    pub fn sync_from_disk(&mut self, task: &TaskRef) -> Result<Vec<String>, AttachError> {
        self.notifier.notify(&self.storage);

        // Enumerate before clearing so an unreadable directory keeps the old list.
        let names = match self.resolve(task, false)? {
            Some(dir) => read_visible(&dir)?,
            None => Vec::new(),
        };
        self.store.clear_attachments(task)?;
        for name in &names {
            self.store.append_attachment(task, name)?;
        }
        self.apply_tag(task, !names.is_empty())?;

        tracing::debug!(task = %task, count = names.len(), "synced attachment list");
        Ok(names)
    }

    /// `sync_from_disk` for each task in turn. Stops at the first error.
    pub fn sync_all(
        &mut self,
        tasks: &[TaskRef],
    ) -> Result<Vec<(TaskRef, Vec<String>)>, AttachError> {
        let mut results = Vec::new();
        for task in tasks {
            let names = self.sync_from_disk(task)?;
            results.push((task.clone(), names));
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // reveal / files / locate
    // -----------------------------------------------------------------------

    /// Hand the attachment directory to `visitor`. Returns `None` (and does
    /// not call the visitor) when there is no directory and `create` is unset.
    pub fn reveal(
        &mut self,
        task: &TaskRef,
        create: bool,
        visitor: &mut dyn DirectoryVisitor,
    ) -> Result<Option<PathBuf>, AttachError> {
        let Some(dir) = self.resolve(task, create)? else {
            return Ok(None);
        };
        visitor.visit(&dir)?;
        Ok(Some(dir))
    }

    /// Visible file names currently on disk, sorted. Leaves the list alone.
    pub fn files(&mut self, task: &TaskRef) -> Result<Vec<String>, AttachError> {
        let Some(dir) = self.resolve(task, false)? else {
            return Ok(vec![]);
        };
        let mut names = read_visible(&dir)?;
        names.sort();
        Ok(names)
    }

    /// Path of the attachment `name`, which must exist on disk.
    pub fn locate(&mut self, task: &TaskRef, name: &str) -> Result<PathBuf, AttachError> {
        validate_name(name)?;
        let dir = self.resolve(task, false)?;
        let not_found = |dir: PathBuf| AttachError::AttachmentNotFound {
            name: name.to_string(),
            dir,
        };
        let dir = match dir {
            Some(dir) => dir,
            None => return Err(not_found(self.storage.absolute_root())),
        };
        let path = dir.join(name);
        if path.exists() {
            Ok(path)
        } else {
            Err(not_found(dir))
        }
    }

    // -----------------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------------

    fn require_dir(&mut self, task: &TaskRef) -> Result<PathBuf, AttachError> {
        let dir = self.resolve(task, true)?;
        dir.ok_or_else(|| AttachError::DirectoryCreateFailed {
            path: self.storage.absolute_root(),
            source: std::io::Error::new(ErrorKind::NotFound, "directory missing after creation"),
        })
    }

    fn apply_tag(&mut self, task: &TaskRef, present: bool) -> Result<(), AttachError> {
        if let Some(tag) = &self.auto_tag {
            self.store.set_tag(task, tag, present)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Filesystem helpers
// ---------------------------------------------------------------------------

fn read_visible(dir: &Path) -> Result<Vec<String>, AttachError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let raw = entry.file_name();
        if raw.to_string_lossy().starts_with('.') {
            continue;
        }
        // The list stores strings; a visible name it cannot hold fails the sync.
        let name = raw.into_string().map_err(|raw| AttachError::InvalidName {
            name: raw.to_string_lossy().into_owned(),
        })?;
        names.push(name);
    }
    Ok(names)
}

fn validate_name(name: &str) -> Result<(), AttachError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(AttachError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Put `source` at `dest` with `method`, replacing whatever `dest` held.
///
/// Every method stages into a hidden sibling of `dest` and renames it into
/// place, so a failed transfer leaves an existing `dest` as it was.
fn transfer(method: AttachMethod, source: &Path, dest: &Path) -> Result<(), AttachError> {
    let failed = |e: std::io::Error| AttachError::MoveFailed {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: e,
    };

    if method == AttachMethod::Move {
        match fs::rename(source, dest) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() != ErrorKind::CrossesDevices => return Err(failed(e)),
            Err(_) => {}
        }
    }

    let staged = staging_path(dest);
    remove_existing(&staged).map_err(failed)?;
    let stage = match method {
        AttachMethod::Move | AttachMethod::Copy => fs::copy(source, &staged).map(|_| ()),
        AttachMethod::Hardlink => fs::hard_link(source, &staged),
        AttachMethod::Symlink => fs::canonicalize(source).and_then(|t| symlink(&t, &staged)),
    };
    if let Err(e) = stage {
        let _ = remove_existing(&staged);
        return Err(failed(e));
    }

    // Cross-device move: the source goes before the staged copy replaces `dest`.
    if method == AttachMethod::Move {
        if let Err(e) = fs::remove_file(source) {
            let _ = fs::remove_file(&staged);
            return Err(failed(e));
        }
    }

    if let Err(e) = fs::rename(&staged, dest) {
        if method == AttachMethod::Move && fs::copy(&staged, source).is_err() {
            tracing::warn!(
                staged = %staged.display(),
                "could not restore {} after a failed move",
                source.display()
            );
            return Err(failed(e));
        }
        let _ = fs::remove_file(&staged);
        return Err(failed(e));
    }
    Ok(())
}

/// `.<name>.<pid>.part` next to `dest`; hidden, so sync never lists it.
fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.{}.part", std::process::id()))
}

fn remove_existing(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    fs::copy(target, link).map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcs::NoopNotifier;
    use satchel_core::{AttachmentListStore, Outline};
    use tempfile::TempDir;

    struct Recorder(Vec<PathBuf>);

    impl DirectoryVisitor for Recorder {
        fn visit(&mut self, dir: &Path) -> Result<(), AttachError> {
            self.0.push(dir.to_path_buf());
            Ok(())
        }
    }

    impl EditBuffer for Recorder {
        fn edit(&mut self, path: &Path) -> Result<(), AttachError> {
            self.0.push(path.to_path_buf());
            Ok(())
        }
    }

    fn outline() -> (Outline, TaskRef) {
        let mut outline = Outline::default();
        outline.add_task("draft").expect("add");
        (outline, TaskRef::from("draft"))
    }

    fn engine<'a>(outline: &'a mut Outline, base: &TempDir) -> Attachments<'a, Outline> {
        Attachments::new(outline, StorageConfig::new("data", base.path()))
            .with_notifier(Box::new(NoopNotifier))
    }

    #[test]
    fn attach_with_visitor_reports_visited() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("notes.txt");
        fs::write(&src, "n").unwrap();
        let (mut doc, task) = outline();

        let mut visitor = Recorder(vec![]);
        let outcome = engine(&mut doc, &base)
            .attach(&task, &src, Some(&mut visitor))
            .unwrap();
        assert!(matches!(outcome, AttachOutcome::Visited { .. }));
        assert_eq!(visitor.0, vec![outcome.dir().to_path_buf()]);
    }

    #[test]
    fn attach_directory_source_is_rejected() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let err = engine(&mut doc, &base)
            .attach(&task, base.path(), None)
            .unwrap_err();
        assert!(matches!(err, AttachError::SourceNotFound { .. }));
        assert!(doc.task(&task).unwrap().id.is_none());
    }

    #[test]
    fn same_basename_overwrites_and_appends_twice() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("v.txt");

        fs::write(&src, "one").unwrap();
        let first = engine(&mut doc, &base).attach(&task, &src, None).unwrap();
        fs::write(&src, "two").unwrap();
        engine(&mut doc, &base).attach(&task, &src, None).unwrap();

        assert_eq!(fs::read_to_string(first.file()).unwrap(), "two");
        assert_eq!(doc.attachments(&task).unwrap(), vec!["v.txt", "v.txt"]);
    }

    #[test]
    fn copy_method_keeps_source() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("keep.txt");
        fs::write(&src, "k").unwrap();

        let outcome = engine(&mut doc, &base)
            .with_method(AttachMethod::Copy)
            .attach(&task, &src, None)
            .unwrap();
        assert!(src.exists());
        assert_eq!(fs::read_to_string(outcome.file()).unwrap(), "k");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_method_points_at_source() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("linked.txt");
        fs::write(&src, "l").unwrap();

        let outcome = engine(&mut doc, &base)
            .with_method(AttachMethod::Symlink)
            .attach(&task, &src, None)
            .unwrap();
        let meta = fs::symlink_metadata(outcome.file()).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(
            fs::read_link(outcome.file()).unwrap(),
            fs::canonicalize(&src).unwrap()
        );
    }

    #[test]
    fn hardlink_method_shares_content() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("hard.txt");
        fs::write(&src, "h").unwrap();

        let outcome = engine(&mut doc, &base)
            .with_method(AttachMethod::Hardlink)
            .attach(&task, &src, None)
            .unwrap();
        assert!(src.exists());
        fs::write(&src, "changed").unwrap();
        assert_eq!(fs::read_to_string(outcome.file()).unwrap(), "changed");
    }

    #[test]
    fn create_new_hands_path_without_creating_file() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let mut editor = Recorder(vec![]);

        let path = engine(&mut doc, &base)
            .create_new(&task, "minutes.org", &mut editor)
            .unwrap();
        assert_eq!(editor.0, vec![path.clone()]);
        assert!(!path.exists());
        assert!(path.parent().unwrap().is_dir());
        assert_eq!(doc.attachments(&task).unwrap(), vec!["minutes.org"]);
    }

    #[test]
    fn create_new_rejects_paths() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let mut editor = Recorder(vec![]);
        for name in ["", "..", "sub/file.txt"] {
            let err = engine(&mut doc, &base)
                .create_new(&task, name, &mut editor)
                .unwrap_err();
            assert!(matches!(err, AttachError::InvalidName { .. }), "{name}");
        }
        assert!(editor.0.is_empty());
        assert!(doc.task(&task).unwrap().id.is_none());
    }

    #[test]
    fn delete_all_prunes_empty_fanout_directory() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        let outcome = engine(&mut doc, &base).attach(&task, &src, None).unwrap();
        let fanout = outcome.dir().parent().unwrap().to_path_buf();

        assert!(engine(&mut doc, &base).delete_all(&task).unwrap());
        assert!(!outcome.dir().exists());
        assert!(!fanout.exists());
        assert!(!engine(&mut doc, &base).delete_all(&task).unwrap());
    }

    #[test]
    fn auto_tag_follows_attachments() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        let tag = Some("ATTACH".to_string());

        engine(&mut doc, &base)
            .with_auto_tag(tag.clone())
            .attach(&task, &src, None)
            .unwrap();
        assert!(doc.task(&task).unwrap().has_tag("ATTACH"));

        let dir = engine(&mut doc, &base).resolve(&task, false).unwrap().unwrap();
        fs::remove_file(dir.join("a.txt")).unwrap();
        engine(&mut doc, &base)
            .with_auto_tag(tag.clone())
            .sync_from_disk(&task)
            .unwrap();
        assert!(!doc.task(&task).unwrap().has_tag("ATTACH"));

        fs::write(dir.join("b.txt"), "b").unwrap();
        engine(&mut doc, &base)
            .with_auto_tag(tag.clone())
            .sync_from_disk(&task)
            .unwrap();
        assert!(doc.task(&task).unwrap().has_tag("ATTACH"));

        engine(&mut doc, &base)
            .with_auto_tag(tag)
            .delete_all(&task)
            .unwrap();
        assert!(!doc.task(&task).unwrap().has_tag("ATTACH"));
    }

    #[test]
    fn files_are_sorted_and_leave_list_untouched() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let dir = engine(&mut doc, &base).resolve(&task, true).unwrap().unwrap();
        for name in ["c.txt", "a.txt", ".git-keep", "b.txt"] {
            fs::write(dir.join(name), name).unwrap();
        }

        let files = engine(&mut doc, &base).files(&task).unwrap();
        assert_eq!(files, vec!["a.txt", "b.txt", "c.txt"]);
        assert!(doc.attachments(&task).unwrap().is_empty());
    }

    #[test]
    fn locate_finds_existing_attachment_only() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let src = base.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        let outcome = engine(&mut doc, &base).attach(&task, &src, None).unwrap();

        let found = engine(&mut doc, &base).locate(&task, "a.txt").unwrap();
        assert_eq!(found, outcome.file());
        let err = engine(&mut doc, &base).locate(&task, "b.txt").unwrap_err();
        assert!(matches!(err, AttachError::AttachmentNotFound { .. }));
    }

    #[test]
    fn reveal_without_directory_skips_visitor() {
        let base = TempDir::new().unwrap();
        let (mut doc, task) = outline();
        let mut visitor = Recorder(vec![]);

        let none = engine(&mut doc, &base)
            .reveal(&task, false, &mut visitor)
            .unwrap();
        assert_eq!(none, None);
        assert!(visitor.0.is_empty());

        let dir = engine(&mut doc, &base)
            .reveal(&task, true, &mut visitor)
            .unwrap()
            .expect("created");
        assert_eq!(visitor.0, vec![dir]);
    }

    #[test]
    fn sync_all_covers_every_task() {
        let base = TempDir::new().unwrap();
        let mut doc = Outline::default();
        doc.add_task("one").unwrap();
        doc.add_task("two").unwrap();
        let one = TaskRef::from("one");
        let two = TaskRef::from("two");
        for task in [&one, &two] {
            let dir = engine(&mut doc, &base).resolve(task, true).unwrap().unwrap();
            fs::write(dir.join(format!("{task}.txt")), "x").unwrap();
        }

        let tasks = doc.identified_tasks();
        let results = engine(&mut doc, &base).sync_all(&tasks).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(doc.attachments(&one).unwrap(), vec!["one.txt"]);
        assert_eq!(doc.attachments(&two).unwrap(), vec!["two.txt"]);
    }
}
