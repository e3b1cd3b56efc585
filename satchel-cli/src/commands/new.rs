//! `satchel new <task> <name> [--no-edit]`

use anyhow::{Context, Result};
use clap::Args;

use satchel_sync::EditBuffer;

use super::Workspace;
use crate::collaborators::{Launcher, PrintPath};
use crate::GlobalArgs;

/// Register a new attachment and open it in an editor.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Task title.
    pub task: String,

    /// File name of the new attachment.
    pub name: String,

    /// Print the target path instead of launching the editor.
    #[arg(long)]
    pub no_edit: bool,
}

impl NewArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let (mut ws, task) = Workspace::open_for(global, &self.task)?;
        let mut editor: Box<dyn EditBuffer> = if self.no_edit {
            Box::new(PrintPath)
        } else {
            Box::new(Launcher::editor(&ws.config))
        };

        ws.with_engine(|engine| engine.create_new(&task, &self.name, editor.as_mut()))
            .with_context(|| format!("failed to create attachment '{}'", self.name))?;
        Ok(())
    }
}
