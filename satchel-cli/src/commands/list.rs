//! `satchel list <task> [--json]` — files on disk against the recorded list.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use satchel_core::AttachmentListStore;

use super::Workspace;
use crate::GlobalArgs;

/// Show a task's attachments.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Task title.
    pub task: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ListJson {
    task: String,
    id: Option<String>,
    dir: Option<String>,
    /// Visible files on disk, sorted.
    files: Vec<String>,
    /// Names recorded on the task.
    listed: Vec<String>,
}

impl ListArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (mut ws, task) = Workspace::open_for(global, &self.task)?;
        let (dir, files) = ws
            .with_engine(|engine| {
                let dir = engine.resolve(&task, false)?;
                Ok((dir, engine.files(&task)?))
            })
            .with_context(|| format!("failed to list attachments of '{task}'"))?;
        let listed = ws.outline.attachments(&task)?;
        let id = ws.outline.task(&task)?.id.as_ref().map(|id| id.0.clone());

        if self.json {
            let payload = ListJson {
                task: task.0.clone(),
                id,
                dir: dir.map(|d| d.display().to_string()),
                files,
                listed,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        let Some(dir) = dir else {
            println!("'{task}' has no attachments");
            return Ok(());
        };
        println!("{} ({})", task, dir.display());
        for name in &files {
            if listed.contains(name) {
                println!("  ·  {name}");
            } else {
                println!("  {}  {name}", "?".yellow());
            }
        }
        for name in listed.iter().filter(|n| !files.contains(*n)) {
            println!("  {}  {name} (missing on disk)", "!".red());
        }
        if files.iter().any(|f| !listed.contains(f)) || listed.iter().any(|n| !files.contains(n)) {
            println!("Run `satchel sync \"{task}\"` to reconcile.");
        }
        Ok(())
    }
}
