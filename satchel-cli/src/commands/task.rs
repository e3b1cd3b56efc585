//! `satchel task add <title>` and `satchel task list`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use super::Workspace;
use crate::GlobalArgs;

/// Manage tasks in the outline.
#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// List every task with its identifier and attachment count.
    List,

    /// Add a new task to the outline.
    Add(AddTaskArgs),
}

#[derive(Args, Debug)]
pub struct AddTaskArgs {
    /// Task title; used as the task reference by every other command.
    pub title: String,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "task")]
    title: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "attachments")]
    attachments: usize,
    #[tabled(rename = "tags")]
    tags: String,
}

pub fn run(global: &GlobalArgs, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::List => list(global),
        TaskCommand::Add(args) => add(global, args),
    }
}

fn list(global: &GlobalArgs) -> Result<()> {
    let ws = Workspace::open(global)?;
    if ws.outline.tasks.is_empty() {
        println!("No tasks in {}.", ws.outline_path.display());
        println!("Run: satchel task add <title>");
        return Ok(());
    }

    let rows: Vec<TaskRow> = ws
        .outline
        .tasks
        .iter()
        .map(|t| TaskRow {
            title: t.title.clone(),
            id: t.id.as_ref().map(|id| id.0.clone()).unwrap_or_else(|| "-".into()),
            attachments: t.attachments.len(),
            tags: t.tags.join(" "),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn add(global: &GlobalArgs, args: AddTaskArgs) -> Result<()> {
    let mut ws = Workspace::open(global)?;
    ws.outline
        .add_task(&args.title)
        .with_context(|| format!("failed to add task '{}'", args.title))?;
    ws.save()?;
    println!(
        "{} Added task '{}' to {}",
        "✓".green(),
        args.title,
        ws.outline_path.display()
    );
    Ok(())
}
