pub mod add;
pub mod delete;
pub mod list;
pub mod new;
pub mod reveal;
pub mod sync;
pub mod task;

use std::path::PathBuf;

use anyhow::{Context, Result};

use satchel_core::{config, outline, Config, Outline, TaskRef};
use satchel_sync::{AttachError, Attachments};

use crate::GlobalArgs;

/// The outline a command works on, plus the effective configuration.
pub struct Workspace {
    pub outline_path: PathBuf,
    pub outline: Outline,
    pub config: Config,
}

impl Workspace {
    /// Load config and outline. A missing outline starts out empty.
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let mut config = config::load().context("failed to load ~/.satchel/config.yaml")?;
        if let Some(root) = &global.root {
            config.storage_root = root.clone();
        }
        let outline = outline::load_or_default(&global.outline)
            .with_context(|| format!("failed to load outline '{}'", global.outline.display()))?;
        Ok(Self {
            outline_path: global.outline.clone(),
            outline,
            config,
        })
    }

    /// Like [`Workspace::open`], but the task must already exist.
    pub fn open_for(global: &GlobalArgs, task: &str) -> Result<(Self, TaskRef)> {
        let ws = Self::open(global)?;
        let task = TaskRef::from(task);
        ws.outline.task(&task).with_context(|| {
            format!(
                "run `satchel task add \"{task}\"` first (outline: {})",
                ws.outline_path.display()
            )
        })?;
        Ok((ws, task))
    }

    pub fn save(&self) -> Result<()> {
        outline::save_at(&self.outline_path, &self.outline)
            .with_context(|| format!("failed to save outline '{}'", self.outline_path.display()))
    }

    /// Run one engine operation, then save the outline.
    ///
    /// The outline is saved even when the operation fails: an identifier
    /// assigned before the failure stays assigned.
    pub fn with_engine<T>(
        &mut self,
        op: impl FnOnce(&mut Attachments<'_, Outline>) -> Result<T, AttachError>,
    ) -> Result<T> {
        let base = outline::base_dir_of(&self.outline_path);
        let result = {
            let mut engine = Attachments::from_config(&mut self.outline, &self.config, &base);
            op(&mut engine)
        };
        self.save()?;
        Ok(result?)
    }
}
