//! Satchel — attach files to outline tasks.
//!
//! # Usage
//!
//! ```text
//! satchel task add <title>
//! satchel task list
//! satchel add <task> <file> [--method move|copy|symlink|hardlink] [--visit]
//! satchel new <task> <name> [--no-edit]
//! satchel delete-all <task> [--yes]
//! satchel sync <task>
//! satchel sync --all
//! satchel reveal <task> [--create] [--print]
//! satchel list <task> [--json]
//! ```
//!
//! Global flags: `--outline <file>` (default `outline.yaml`), `--root <dir>`
//! (overrides `storage_root`), `-v`/`-vv`.

mod collaborators;
mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{
    add::AddArgs, delete::DeleteAllArgs, list::ListArgs, new::NewArgs, reveal::RevealArgs,
    sync::SyncArgs, task::TaskCommand,
};
use satchel_core::AttachMethod;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "satchel",
    version,
    about = "Attach files to tasks in an outline",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Outline file holding the tasks.
    #[arg(long, global = true, default_value = satchel_core::outline::DEFAULT_OUTLINE)]
    pub outline: PathBuf,

    /// Attachment storage root (relative paths resolve against the outline's directory).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or list tasks in the outline.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Attach an existing file to a task.
    Add(AddArgs),

    /// Register a new attachment and open it in an editor.
    New(NewArgs),

    /// Remove every attachment of a task.
    DeleteAll(DeleteAllArgs),

    /// Rebuild attachment lists from the files on disk.
    Sync(SyncArgs),

    /// Open a task's attachment directory.
    Reveal(RevealArgs),

    /// Show a task's attachments.
    List(ListArgs),
}

// ---------------------------------------------------------------------------
// AttachMethod argument, parsed from CLI strings and converted to the core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `AttachMethod` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachMethodArg(pub AttachMethod);

impl FromStr for AttachMethodArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "move" | "mv" => Ok(Self(AttachMethod::Move)),
            "copy" | "cp" => Ok(Self(AttachMethod::Copy)),
            "symlink" | "ln-s" => Ok(Self(AttachMethod::Symlink)),
            "hardlink" | "ln" => Ok(Self(AttachMethod::Hardlink)),
            other => Err(format!(
                "unknown attach method '{other}'; expected: move, copy, symlink, hardlink"
            )),
        }
    }
}

impl fmt::Display for AttachMethodArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AttachMethodArg> for AttachMethod {
    fn from(m: AttachMethodArg) -> Self {
        m.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = cli.global;
    match cli.command {
        Commands::Task { command } => commands::task::run(&global, command),
        Commands::Add(args) => args.run(&global),
        Commands::New(args) => args.run(&global),
        Commands::DeleteAll(args) => args.run(&global),
        Commands::Sync(args) => args.run(&global),
        Commands::Reveal(args) => args.run(&global),
        Commands::List(args) => args.run(&global),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
