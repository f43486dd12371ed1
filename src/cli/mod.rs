//! Command-line interface for todo
//!
//! This module defines the CLI structure using clap derive macros. The same
//! task commands are used for one-shot invocations (`todo add ...`) and for
//! lines typed into the interactive shell (`todo` with no subcommand).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::{error_message, OutputOptions};
use crate::store::{LoadReport, TaskStore};

pub mod shell;
pub mod task;

/// todo - personal task list
///
/// Tasks are kept in a JSON file (default ~/.todo.json) with rotating
/// backups in todo_backups/ next to it.
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task data file (defaults to ~/.todo.json)
    #[arg(long, global = true, env = "TODO_FILE")]
    pub file: Option<PathBuf>,

    /// Path to a TOML config file (defaults to ~/.todo.toml when present)
    #[arg(long, global = true, env = "TODO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Task(TaskCommand),

    /// Start the interactive shell (default)
    Shell,
}

/// Commands that operate on the task list
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task
    #[command(visible_alias = "a")]
    Add {
        /// Task content (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,

        /// Priority: high, normal, low
        #[arg(short, long)]
        priority: Option<String>,

        /// Due date: YYYY-MM-DD HH:MM, YYYY-MM-DD, MM/DD, today, tomorrow, 3days
        #[arg(long)]
        due: Option<String>,
    },

    /// Change a task's content, priority or due date
    #[command(visible_alias = "e")]
    Edit {
        /// Task ID
        id: u64,

        /// New content (words are joined with spaces)
        content: Vec<String>,

        /// New priority: high, normal, low
        #[arg(short, long)]
        priority: Option<String>,

        /// New due date, or "none" to clear it
        #[arg(long)]
        due: Option<String>,
    },

    /// Mark a task done
    #[command(visible_alias = "d")]
    Done {
        /// Task ID
        id: u64,
    },

    /// Delete a task
    #[command(visible_aliases = ["r", "rm"])]
    Remove {
        /// Task ID
        id: u64,
    },

    /// Delete all tasks
    #[command(visible_alias = "c")]
    Clear,

    /// Find tasks whose content contains a keyword (case-insensitive)
    #[command(visible_alias = "s")]
    Search {
        /// Keyword (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        keyword: Vec<String>,
    },

    /// List tasks
    #[command(visible_aliases = ["l", "ls"])]
    List {
        /// Only tasks with this status: pending, done
        #[arg(long)]
        status: Option<String>,

        /// Only tasks with this priority: high, normal, low
        #[arg(short, long)]
        priority: Option<String>,

        /// Only tasks created on or after this date (YYYY-MM-DD)
        #[arg(long)]
        created_after: Option<String>,

        /// Sort by due date instead of priority
        #[arg(long)]
        due: bool,
    },

    /// Show task statistics
    #[command(visible_alias = "st")]
    Stats,

    /// List retained backups of the data file
    Backups,
}

impl TaskCommand {
    /// Canonical command name for output envelopes
    pub fn name(&self) -> &'static str {
        match self {
            TaskCommand::Add { .. } => "add",
            TaskCommand::Edit { .. } => "edit",
            TaskCommand::Done { .. } => "done",
            TaskCommand::Remove { .. } => "remove",
            TaskCommand::Clear => "clear",
            TaskCommand::Search { .. } => "search",
            TaskCommand::List { .. } => "list",
            TaskCommand::Stats => "stats",
            TaskCommand::Backups => "backups",
        }
    }
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let (mut store, report) = TaskStore::open(&config)?;

        match self.command.unwrap_or(Commands::Shell) {
            Commands::Task(command) => {
                report_load(&mut store, &report);
                task::run(&mut store, command, options)
            }
            Commands::Shell => {
                let stdin = std::io::stdin();
                shell::run(&mut store, &report, options, stdin.lock())
            }
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };
        if let Some(file) = &self.file {
            config.data_file = file.clone();
        }
        Ok(config)
    }
}

/// Print load recovery and backup warnings to stderr
pub fn report_load(store: &mut TaskStore, report: &LoadReport) {
    if let Some(err) = &report.recovered {
        eprintln!("warning: {}; starting with an empty list", error_message(err));
    }
    for warning in store.take_warnings() {
        eprintln!("warning: {warning}");
    }
}
