//! `satchel reveal <task> [--create] [--print]`

use anyhow::{Context, Result};
use clap::Args;

use satchel_sync::DirectoryVisitor;

use super::Workspace;
use crate::collaborators::{Launcher, PrintPath};
use crate::GlobalArgs;

/// Open a task's attachment directory.
#[derive(Args, Debug)]
pub struct RevealArgs {
    /// Task title.
    pub task: String,

    /// Create the directory (and an identifier) if it does not exist.
    #[arg(long)]
    pub create: bool,

    /// Print the directory instead of opening it.
    #[arg(long)]
    pub print: bool,
}

impl RevealArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (mut ws, task) = Workspace::open_for(global, &self.task)?;
        let mut visitor: Box<dyn DirectoryVisitor> = if self.print {
            Box::new(PrintPath)
        } else {
            Box::new(Launcher::opener(&ws.config))
        };

        let dir = ws
            .with_engine(|engine| engine.reveal(&task, self.create, visitor.as_mut()))
            .with_context(|| format!("failed to reveal attachments of '{task}'"))?;
        if dir.is_none() {
            println!("'{task}' has no attachment directory (use --create)");
        }
        Ok(())
    }
}
