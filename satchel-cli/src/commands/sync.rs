//! `satchel sync <task>` / `satchel sync --all` — rebuild lists from disk.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use satchel_core::TaskRef;

use super::Workspace;
use crate::GlobalArgs;

/// Arguments for `satchel sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Task to sync (omit when using `--all`).
    pub task: Option<String>,

    /// Sync every task that has an identifier.
    #[arg(long, conflicts_with = "task")]
    pub all: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        if self.all {
            let mut ws = Workspace::open(global)?;
            let tasks = ws.outline.identified_tasks();
            if tasks.is_empty() {
                println!("No task has attachments yet.");
                return Ok(());
            }
            let results = ws
                .with_engine(|engine| engine.sync_all(&tasks))
                .context("sync --all failed")?;
            for (task, names) in &results {
                print_result(task, names);
            }
        } else {
            let name = self.task.context("provide a task title or use --all")?;
            let (mut ws, task) = Workspace::open_for(global, &name)?;
            let names = ws
                .with_engine(|engine| engine.sync_from_disk(&task))
                .with_context(|| format!("sync failed for '{task}'"))?;
            print_result(&task, &names);
        }
        Ok(())
    }
}

fn print_result(task: &TaskRef, names: &[String]) {
    println!("{} '{}' synced ({} attachment(s))", "✓".green(), task, names.len());
    for name in names {
        println!("  ·  {name}");
    }
}
