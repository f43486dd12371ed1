//! todo - personal task list library
//!
//! This library provides the core functionality for the todo CLI: a task
//! list kept in a JSON file, protected by rotating backups and validated on
//! every load.
//!
//! # Module Organization
//!
//! - `backup`: Timestamped snapshots of the data file and retention
//! - `cli`: Command-line interface and interactive shell using clap
//! - `config`: Configuration loading from `~/.todo.toml`
//! - `due`: Due date parsing (absolute, date-only and relative input)
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output, error reporting
//! - `schema`: Load-time validation of the data file
//! - `store`: The task store (load, save, add/edit/done/remove/clear, queries)
//! - `task`: Task records, priorities, filters and ordering

pub mod backup;
pub mod cli;
pub mod config;
pub mod due;
pub mod error;
pub mod output;
pub mod schema;
pub mod store;
pub mod task;

pub use error::{Error, Result};
