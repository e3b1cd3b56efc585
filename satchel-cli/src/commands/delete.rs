//! `satchel delete-all <task> [--yes]`

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::Workspace;
use crate::GlobalArgs;

/// Remove every attachment of a task.
#[derive(Args, Debug)]
pub struct DeleteAllArgs {
    /// Task title.
    pub task: String,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl DeleteAllArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (mut ws, task) = Workspace::open_for(global, &self.task)?;
        if !self.yes && !confirm(&format!("Delete all attachments of '{task}'?"))? {
            println!("Aborted.");
            return Ok(());
        }

        let removed = ws
            .with_engine(|engine| engine.delete_all(&task))
            .with_context(|| format!("failed to delete attachments of '{task}'"))?;
        if removed {
            println!("{} Deleted all attachments of '{}'", "✓".green(), task);
        } else {
            println!("{} '{}' has no attachment directory", "·".dimmed(), task);
        }
        Ok(())
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
