//! todo task command implementations.

use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::TaskCommand;
use crate::error::{Error, Result};
use crate::output::{emit_success, format_task_line, HumanOutput, OutputOptions};
use crate::store::{EditRequest, TaskStore};
use crate::task::{format_timestamp, now_minute, ListFilter, Priority, SortOrder, TaskRecord, TaskStatus};

#[derive(Serialize)]
struct TaskEditedOutput<'a> {
    id: u64,
    changed: bool,
    task: &'a TaskRecord,
}

#[derive(Serialize)]
struct TaskClearedOutput {
    removed: usize,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    tasks: Vec<&'a TaskRecord>,
}

#[derive(Serialize)]
struct TaskSearchOutput<'a> {
    keyword: &'a str,
    total: usize,
    tasks: Vec<&'a TaskRecord>,
}

#[derive(Serialize)]
struct BackupsOutput {
    dir: String,
    keep: usize,
    backups: Vec<String>,
}

/// Execute one task command against the store
pub fn run(store: &mut TaskStore, command: TaskCommand, options: OutputOptions) -> Result<()> {
    match command {
        TaskCommand::Add {
            content,
            priority,
            due,
        } => run_add(store, &content.join(" "), priority.as_deref(), due.as_deref(), options),
        TaskCommand::Edit {
            id,
            content,
            priority,
            due,
        } => {
            let request = EditRequest {
                content: if content.is_empty() {
                    None
                } else {
                    Some(content.join(" "))
                },
                priority,
                due,
            };
            run_edit(store, id, request, options)
        }
        TaskCommand::Done { id } => run_done(store, id, options),
        TaskCommand::Remove { id } => run_remove(store, id, options),
        TaskCommand::Clear => run_clear(store, options),
        TaskCommand::Search { keyword } => run_search(store, &keyword.join(" "), options),
        TaskCommand::List {
            status,
            priority,
            created_after,
            due,
        } => {
            let filter = ListFilter {
                status: status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
                priority: priority.as_deref().map(str::parse::<Priority>).transpose()?,
                created_after: created_after.as_deref().map(parse_date).transpose()?,
            };
            let order = if due { SortOrder::Due } else { SortOrder::Priority };
            run_list(store, &filter, order, options)
        }
        TaskCommand::Stats => run_stats(store, options),
        TaskCommand::Backups => run_backups(store, options),
    }
}

pub fn run_add(
    store: &mut TaskStore,
    content: &str,
    priority: Option<&str>,
    due: Option<&str>,
    options: OutputOptions,
) -> Result<()> {
    let id = store.add(content, priority, due)?;
    let warnings = store.take_warnings();
    let task = find(store, id)?;

    let mut human = HumanOutput::new(format!("Task {id} added"));
    human.push_summary("Priority", task.priority.as_str());
    if let Some(due) = &task.due_date {
        human.push_summary("Due", format_timestamp(due));
    }
    human.extend_warnings(warnings);

    emit_success(options, "add", task, Some(&human))
}

pub fn run_edit(
    store: &mut TaskStore,
    id: u64,
    request: EditRequest,
    options: OutputOptions,
) -> Result<()> {
    let changed = store.edit(id, request)?;
    let warnings = store.take_warnings();
    let task = find(store, id)?;

    let mut human = if changed {
        let mut human = HumanOutput::new(format!("Task {id} updated"));
        human.push_detail(format_task_line(task, now_minute()));
        human
    } else {
        let mut human = HumanOutput::new(format!("Task {id} unchanged"));
        human.push_next_step(format!(
            "todo edit {id} [content] --priority <high|normal|low> --due <date|none>"
        ));
        human
    };
    human.extend_warnings(warnings);

    let output = TaskEditedOutput { id, changed, task };
    emit_success(options, "edit", &output, Some(&human))
}

pub fn run_done(store: &mut TaskStore, id: u64, options: OutputOptions) -> Result<()> {
    store.done(id)?;
    let warnings = store.take_warnings();
    let task = find(store, id)?;

    let mut human = HumanOutput::new(format!("Task {id} done"));
    human.extend_warnings(warnings);

    emit_success(options, "done", task, Some(&human))
}

pub fn run_remove(store: &mut TaskStore, id: u64, options: OutputOptions) -> Result<()> {
    let removed = store.remove(id)?;

    let mut human = HumanOutput::new(format!("Task {id} removed"));
    human.push_detail(format_task_line(&removed, now_minute()));
    human.extend_warnings(store.take_warnings());

    emit_success(options, "remove", &removed, Some(&human))
}

pub fn run_clear(store: &mut TaskStore, options: OutputOptions) -> Result<()> {
    let removed = store.clear()?;

    let mut human = HumanOutput::new("All tasks cleared");
    human.push_summary("Removed", removed.to_string());
    human.extend_warnings(store.take_warnings());

    emit_success(options, "clear", &TaskClearedOutput { removed }, Some(&human))
}

pub fn run_search(store: &mut TaskStore, keyword: &str, options: OutputOptions) -> Result<()> {
    let tasks = store.search(keyword)?;
    let now = now_minute();

    let mut human = if tasks.is_empty() {
        HumanOutput::new(format!("No tasks match '{}'", keyword.trim()))
    } else {
        HumanOutput::new(format!("{} tasks match '{}'", tasks.len(), keyword.trim()))
    };
    for task in &tasks {
        human.push_detail(format_task_line(task, now));
    }

    let output = TaskSearchOutput {
        keyword: keyword.trim(),
        total: tasks.len(),
        tasks,
    };
    emit_success(options, "search", &output, Some(&human))
}

pub fn run_list(
    store: &mut TaskStore,
    filter: &ListFilter,
    order: SortOrder,
    options: OutputOptions,
) -> Result<()> {
    let tasks = store.list(filter, order);
    let now = now_minute();

    let mut human = if tasks.is_empty() {
        HumanOutput::new("No tasks")
    } else {
        HumanOutput::new("Tasks")
    };
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(format_task_line(task, now));
    }

    let output = TaskListOutput {
        total: tasks.len(),
        tasks,
    };
    emit_success(options, "list", &output, Some(&human))
}

pub fn run_stats(store: &mut TaskStore, options: OutputOptions) -> Result<()> {
    let stats = store.stats();

    let mut human = HumanOutput::new("Task stats");
    human.push_summary("Total", stats.total.to_string());
    if stats.total > 0 {
        human.push_summary(
            "Done",
            format!(
                "{} ({:.1}%)",
                stats.done,
                stats.done as f64 / stats.total as f64 * 100.0
            ),
        );
        human.push_summary("Pending", stats.pending.to_string());
        human.push_summary("Overdue", stats.overdue.to_string());
        human.push_summary("Created today", stats.created_today.to_string());
        human.push_summary("Completed today", stats.completed_today.to_string());
        human.push_summary("Created last 7 days", stats.created_last_7_days.to_string());
        human.push_summary(
            "Completed last 7 days",
            stats.completed_last_7_days.to_string(),
        );
        human.push_detail(format!(
            "Priorities: high {}, normal {}, low {}",
            stats.priority.high, stats.priority.normal, stats.priority.low
        ));
    }

    emit_success(options, "stats", &stats, Some(&human))
}

pub fn run_backups(store: &mut TaskStore, options: OutputOptions) -> Result<()> {
    let backups = store.backups().list()?;
    let manager = store.backups();

    let mut human = if backups.is_empty() {
        HumanOutput::new("No backups")
    } else {
        HumanOutput::new("Backups (newest first)")
    };
    human.push_summary("Directory", manager.dir().display().to_string());
    human.push_summary("Retained", manager.keep().to_string());
    for path in &backups {
        human.push_detail(path.display().to_string());
    }

    let output = BackupsOutput {
        dir: manager.dir().display().to_string(),
        keep: manager.keep(),
        backups: backups
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    };
    emit_success(options, "backups", &output, Some(&human))
}

fn find(store: &TaskStore, id: u64) -> Result<&TaskRecord> {
    store.get(id).ok_or_else(|| Error::NotFound {
        id,
        available: store.tasks().iter().map(|task| task.id).collect(),
    })
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!(
            "invalid date '{}' (expected YYYY-MM-DD)",
            value.trim()
        ))
    })
}
