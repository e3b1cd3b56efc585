//! Collaborator interfaces the attachment engine is written against, and the
//! [`Outline`] implementation of them.
//!
//! The engine never reaches into an outline directly: it asks an
//! [`IdentifierProvider`] for a task's identifier and reads/writes the
//! attachment list through an [`AttachmentListStore`]. Any host that can
//! answer those calls can carry attachments.

use chrono::Utc;

use crate::error::OutlineError;
use crate::types::{Outline, Task, TaskId, TaskRef};

/// Supplies the stable identifier of a task.
pub trait IdentifierProvider {
    /// Current identifier of `task`. When `create` is set and the task has
    /// none, a new identifier is generated and permanently assigned.
    fn identifier(&mut self, task: &TaskRef, create: bool) -> Result<Option<TaskId>, OutlineError>;

    /// Assign `id` to `task`. Fails if a different identifier is already set.
    fn set_identifier(&mut self, task: &TaskRef, id: TaskId) -> Result<(), OutlineError>;
}

/// Reads and writes a task's attachment list.
///
/// `append_attachment` appends unconditionally; the list is not deduplicated.
pub trait AttachmentListStore {
    fn attachments(&self, task: &TaskRef) -> Result<Vec<String>, OutlineError>;
    fn append_attachment(&mut self, task: &TaskRef, name: &str) -> Result<(), OutlineError>;
    fn clear_attachments(&mut self, task: &TaskRef) -> Result<(), OutlineError>;
}

/// Adds or removes a tag on a task.
pub trait TagStore {
    fn set_tag(&mut self, task: &TaskRef, tag: &str, present: bool) -> Result<(), OutlineError>;
}

/// Everything the attachment engine needs from its host.
pub trait TaskStore: IdentifierProvider + AttachmentListStore + TagStore {}

impl<T: IdentifierProvider + AttachmentListStore + TagStore> TaskStore for T {}

// ---------------------------------------------------------------------------
// Outline lookups
// ---------------------------------------------------------------------------

impl Outline {
    pub fn task(&self, task: &TaskRef) -> Result<&Task, OutlineError> {
        self.tasks
            .iter()
            .find(|t| t.title == task.0)
            .ok_or_else(|| OutlineError::TaskNotFound {
                title: task.0.clone(),
            })
    }

    pub fn task_mut(&mut self, task: &TaskRef) -> Result<&mut Task, OutlineError> {
        self.tasks
            .iter_mut()
            .find(|t| t.title == task.0)
            .ok_or_else(|| OutlineError::TaskNotFound {
                title: task.0.clone(),
            })
    }

    /// Append a new task. Titles are the task reference, so they must be unique.
    pub fn add_task(&mut self, title: &str) -> Result<&Task, OutlineError> {
        if self.tasks.iter().any(|t| t.title == title) {
            return Err(OutlineError::DuplicateTask {
                title: title.to_string(),
            });
        }
        self.tasks.push(Task::new(title));
        self.updated_at = Utc::now();
        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    /// References of every task that already has an identifier.
    pub fn identified_tasks(&self) -> Vec<TaskRef> {
        self.tasks
            .iter()
            .filter(|t| t.id.is_some())
            .map(Task::task_ref)
            .collect()
    }

    fn touch(&mut self, task: &TaskRef) -> Result<&mut Task, OutlineError> {
        let now = Utc::now();
        self.updated_at = now;
        let t = self.task_mut(task)?;
        t.updated_at = now;
        Ok(t)
    }
}

impl IdentifierProvider for Outline {
    fn identifier(&mut self, task: &TaskRef, create: bool) -> Result<Option<TaskId>, OutlineError> {
        if let Some(id) = &self.task(task)?.id {
            return Ok(Some(id.clone()));
        }
        if !create {
            return Ok(None);
        }
        let id = TaskId::generate();
        self.set_identifier(task, id.clone())?;
        Ok(Some(id))
    }

    fn set_identifier(&mut self, task: &TaskRef, id: TaskId) -> Result<(), OutlineError> {
        let current = self.task(task)?;
        if let Some(existing) = &current.id {
            if *existing == id {
                return Ok(());
            }
            return Err(OutlineError::IdentifierConflict {
                title: current.title.clone(),
                existing: existing.0.clone(),
            });
        }
        self.touch(task)?.id = Some(id);
        Ok(())
    }
}

impl AttachmentListStore for Outline {
    fn attachments(&self, task: &TaskRef) -> Result<Vec<String>, OutlineError> {
        Ok(self.task(task)?.attachments.clone())
    }

    fn append_attachment(&mut self, task: &TaskRef, name: &str) -> Result<(), OutlineError> {
        self.touch(task)?.attachments.push(name.to_string());
        Ok(())
    }

    fn clear_attachments(&mut self, task: &TaskRef) -> Result<(), OutlineError> {
        self.touch(task)?.attachments.clear();
        Ok(())
    }
}

impl TagStore for Outline {
    fn set_tag(&mut self, task: &TaskRef, tag: &str, present: bool) -> Result<(), OutlineError> {
        if self.task(task)?.has_tag(tag) == present {
            return Ok(());
        }
        let t = self.touch(task)?;
        if present {
            t.tags.push(tag.to_string());
        } else {
            t.tags.retain(|existing| existing != tag);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn outline_with(title: &str) -> (Outline, TaskRef) {
        let mut outline = Outline::default();
        outline.add_task(title).expect("add task");
        (outline, TaskRef::from(title))
    }

    #[test]
    fn identifier_absent_without_create() {
        let (mut outline, task) = outline_with("draft");
        assert_eq!(outline.identifier(&task, false).unwrap(), None);
        assert!(outline.task(&task).unwrap().id.is_none());
    }

    #[test]
    fn identifier_created_once_then_stable() {
        let (mut outline, task) = outline_with("draft");
        let first = outline.identifier(&task, true).unwrap().expect("created");
        let second = outline.identifier(&task, true).unwrap().expect("existing");
        assert_eq!(first, second);
        assert_eq!(outline.identifier(&task, false).unwrap(), Some(first));
    }

    #[test]
    fn set_identifier_refuses_to_overwrite() {
        let (mut outline, task) = outline_with("draft");
        outline.set_identifier(&task, TaskId::from("abc-1")).unwrap();
        outline.set_identifier(&task, TaskId::from("abc-1")).unwrap();
        let err = outline
            .set_identifier(&task, TaskId::from("zzz-2"))
            .unwrap_err();
        assert!(matches!(err, OutlineError::IdentifierConflict { .. }));
    }

    #[test]
    fn append_keeps_duplicates_and_order() {
        let (mut outline, task) = outline_with("draft");
        outline.append_attachment(&task, "b.txt").unwrap();
        outline.append_attachment(&task, "a.txt").unwrap();
        outline.append_attachment(&task, "b.txt").unwrap();
        assert_eq!(
            outline.attachments(&task).unwrap(),
            vec!["b.txt", "a.txt", "b.txt"]
        );
        outline.clear_attachments(&task).unwrap();
        assert!(outline.attachments(&task).unwrap().is_empty());
    }

    #[test]
    fn tags_toggle_without_duplicates() {
        let (mut outline, task) = outline_with("draft");
        outline.set_tag(&task, "ATTACH", true).unwrap();
        outline.set_tag(&task, "ATTACH", true).unwrap();
        assert_eq!(outline.task(&task).unwrap().tags, vec!["ATTACH"]);
        outline.set_tag(&task, "ATTACH", false).unwrap();
        assert!(outline.task(&task).unwrap().tags.is_empty());
    }

    #[test]
    fn unknown_task_is_an_error() {
        let mut outline = Outline::default();
        let err = outline
            .identifier(&TaskRef::from("missing"), true)
            .unwrap_err();
        assert!(matches!(err, OutlineError::TaskNotFound { .. }));
    }

    #[test]
    fn duplicate_titles_are_rejected() {
        let (mut outline, _) = outline_with("draft");
        let err = outline.add_task("draft").unwrap_err();
        assert!(matches!(err, OutlineError::DuplicateTask { .. }));
    }
}
