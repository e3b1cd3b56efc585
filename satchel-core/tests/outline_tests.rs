//! Outline persistence and collaborator-trait integration tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use satchel_core::{
    outline, AttachmentListStore, IdentifierProvider, Outline, OutlineError, TagStore, TaskRef,
};

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_outline_names_the_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = outline::load_at(&dir.path().join("notes.yaml")).unwrap_err();
    assert!(matches!(err, OutlineError::OutlineNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("notes.yaml"));
}

#[rstest]
#[case(": : corrupt : yaml : !!!\n  - broken: [unclosed")]
#[case("- this is a list, not a mapping\n")]
#[case("version: one\ntasks: []\n")]
fn malformed_outline_returns_parse_error(#[case] body: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("notes.yaml");
    file.write_str(body).expect("write");

    let err = outline::load_at(file.path()).unwrap_err();
    assert!(matches!(err, OutlineError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("notes.yaml"));
}

// ---------------------------------------------------------------------------
// 2. Persistence of collaborator mutations
// ---------------------------------------------------------------------------

#[test]
fn identifier_and_attachments_survive_save() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("notes.yaml");
    let task = TaskRef::from("Quarterly report");

    let mut doc = Outline::default();
    doc.add_task(&task.0).expect("add");
    let id = doc.identifier(&task, true).expect("id").expect("created");
    doc.append_attachment(&task, "report.pdf").expect("append");
    doc.set_tag(&task, "ATTACH", true).expect("tag");
    outline::save_at(file.path(), &doc).expect("save");

    file.assert(predicate::str::contains(id.as_str()));
    file.assert(predicate::str::contains("report.pdf"));

    let mut loaded = outline::load_at(file.path()).expect("load");
    assert_eq!(loaded.identifier(&task, false).expect("id"), Some(id));
    assert_eq!(loaded.attachments(&task).expect("list"), vec!["report.pdf"]);
    assert!(loaded.task(&task).expect("task").has_tag("ATTACH"));
}

#[test]
fn identified_tasks_skips_tasks_without_id() {
    let mut doc = Outline::default();
    doc.add_task("with id").expect("add");
    doc.add_task("without id").expect("add");
    doc.identifier(&TaskRef::from("with id"), true).expect("id");

    assert_eq!(doc.identified_tasks(), vec![TaskRef::from("with id")]);
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let nested = dir.child("a").child("b").child("notes.yaml");
    outline::save_at(nested.path(), &Outline::default()).expect("save");
    nested.assert(predicate::path::exists());
}
