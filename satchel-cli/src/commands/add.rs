//! `satchel add <task> <file> [--method ...] [--visit]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use satchel_sync::{AttachOutcome, DirectoryVisitor};

use super::Workspace;
use crate::collaborators::Launcher;
use crate::{AttachMethodArg, GlobalArgs};

/// Attach an existing file to a task.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title.
    pub task: String,

    /// File to attach. Moved into the attachment directory by default.
    pub file: PathBuf,

    /// How to transfer the file: move | copy | symlink | hardlink.
    #[arg(long, short = 'm', value_name = "METHOD")]
    pub method: Option<AttachMethodArg>,

    /// Open the attachment directory afterwards.
    #[arg(long)]
    pub visit: bool,
}

impl AddArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (mut ws, task) = Workspace::open_for(global, &self.task)?;
        if let Some(method) = self.method {
            ws.config.method = method.into();
        }
        let mut launcher = self.visit.then(|| Launcher::opener(&ws.config));

        let outcome = ws
            .with_engine(|engine| {
                engine.attach(
                    &task,
                    &self.file,
                    launcher.as_mut().map(|l| l as &mut dyn DirectoryVisitor),
                )
            })
            .with_context(|| format!("failed to attach '{}'", self.file.display()))?;

        if let AttachOutcome::Attached { file, .. } = &outcome {
            println!("{} Attached to '{}'", "✓".green(), task);
            println!("  {}", file.display());
        }
        Ok(())
    }
}
