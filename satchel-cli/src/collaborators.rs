//! Terminal implementations of the engine's visitor and editor collaborators.

use std::path::Path;
use std::process::Command;

use satchel_core::Config;
use satchel_sync::{AttachError, DirectoryVisitor, EditBuffer};

/// Prints the path it is handed.
pub struct PrintPath;

impl DirectoryVisitor for PrintPath {
    fn visit(&mut self, dir: &Path) -> Result<(), AttachError> {
        println!("{}", dir.display());
        Ok(())
    }
}

impl EditBuffer for PrintPath {
    fn edit(&mut self, path: &Path) -> Result<(), AttachError> {
        println!("{}", path.display());
        Ok(())
    }
}

/// Runs an external program with the path as its last argument and waits for it.
pub struct Launcher {
    program: String,
    args: Vec<String>,
}

impl Launcher {
    /// Parse `"code --wait"` style command lines.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Directory opener: `open_command`, else the platform's file manager.
    pub fn opener(config: &Config) -> Self {
        let line = config
            .open_command
            .clone()
            .unwrap_or_else(|| platform_opener().to_string());
        Self::from_command_line(&line).unwrap_or_else(|| Self::plain(platform_opener()))
    }

    /// Editor: `editor`, else `$VISUAL`, else `$EDITOR`, else `vi`.
    pub fn editor(config: &Config) -> Self {
        let line = config
            .editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_default();
        Self::from_command_line(&line).unwrap_or_else(|| Self::plain("vi"))
    }

    fn plain(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: vec![],
        }
    }

    fn launch(&self, path: &Path) -> Result<(), AttachError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .map_err(|e| {
                AttachError::Collaborator(format!("cannot run '{}': {e}", self.program))
            })?;
        if !status.success() {
            return Err(AttachError::Collaborator(format!(
                "'{}' exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

impl DirectoryVisitor for Launcher {
    fn visit(&mut self, dir: &Path) -> Result<(), AttachError> {
        self.launch(dir)
    }
}

impl EditBuffer for Launcher {
    fn edit(&mut self, path: &Path) -> Result<(), AttachError> {
        self.launch(path)
    }
}

fn platform_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}
