//! Shared output formatting for todo commands.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{format_timestamp, TaskRecord};

pub const SCHEMA_VERSION: &str = "todo.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }

    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = String>) {
        self.warnings.extend(warnings);
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

/// Report a failed command. This is the only place error kinds become text.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: err.kind(),
                details: err.details(),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {}", error_message(err));
    for hint in next_steps {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// Human text for an error, including context the bare `Display` omits
pub fn error_message(err: &Error) -> String {
    match err {
        Error::NotFound { id, available } if available.is_empty() => {
            format!("task {id} not found (no tasks available)")
        }
        Error::NotFound { id, available } => {
            let ids: Vec<String> = available.iter().map(u64::to_string).collect();
            format!("task {id} not found (available ids: {})", ids.join(", "))
        }
        Error::Format {
            message,
            backup: Some(backup),
        } => format!(
            "data file is corrupted ({message}); previous contents saved to {}",
            backup.display()
        ),
        Error::Schema {
            backup: Some(backup),
            ..
        } => format!(
            "{err}; previous contents saved to {}",
            backup.display()
        ),
        Error::SaveFailed { path, source } => format!(
            "could not save {} ({}); the change was not applied",
            path.display(),
            source
        ),
        other => other.to_string(),
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::NotFound { .. } => vec!["todo list".to_string()],
        Error::AlreadyDone(_) => vec!["todo list --status pending".to_string()],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix ~/.todo.toml then retry".to_string()]
        }
        Error::Format { .. } | Error::Schema { .. } => {
            vec!["todo backups".to_string()]
        }
        _ => Vec::new(),
    }
}

/// One task as a single line: `#id [x] priority created (modified) [due] -> content`
pub fn format_task_line(task: &TaskRecord, now: NaiveDateTime) -> String {
    let mut line = format!(
        "#{:<4} [{}] {:<6} {}",
        task.id,
        if task.is_done() { "x" } else { " " },
        task.priority.as_str(),
        format_timestamp(&task.created)
    );
    if task.modified != task.created {
        line.push_str(&format!(" (modified {})", format_timestamp(&task.modified)));
    }
    if let Some(due) = &task.due_date {
        let marker = if task.is_overdue(now) { "OVERDUE " } else { "" };
        line.push_str(&format!(" [{marker}due {}]", format_timestamp(due)));
    }
    line.push_str(" -> ");
    line.push_str(&task.content);
    line
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

/// First positional argument, skipping the values of global options
fn command_name_from(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--file" || arg == "--config" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "shell".to_string()
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{parse_timestamp, Priority};

    #[test]
    fn task_line_marks_overdue() {
        let created = parse_timestamp("2026-10-01 09:00").expect("created");
        let mut task = TaskRecord::new(4, "file taxes".to_string(), Priority::High, created);
        task.due_date = Some(parse_timestamp("2026-10-10 23:59").expect("due"));
        let now = parse_timestamp("2026-10-18 12:00").expect("now");
        let line = format_task_line(&task, now);
        assert!(line.starts_with("#4"));
        assert!(line.contains("[OVERDUE due 2026-10-10 23:59]"));
        assert!(line.ends_with("-> file taxes"));
        assert!(!line.contains("modified"));
    }

    #[test]
    fn not_found_message_lists_ids() {
        let err = Error::NotFound {
            id: 9,
            available: vec![1, 3],
        };
        assert_eq!(error_message(&err), "task 9 not found (available ids: 1, 3)");
    }

    #[test]
    fn command_name_skips_option_values() {
        let args = ["--file", "list.json", "--json", "done", "3"].map(String::from);
        assert_eq!(command_name_from(args), "done");
        assert_eq!(command_name_from(Vec::<String>::new()), "shell");
    }

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("Task added");
        human.push_summary("ID", "3");
        human.extend_warnings(vec!["backup before save failed".to_string()]);
        let text = format_human(&human);
        assert!(text.starts_with("Task added"));
        assert!(text.contains("- ID: 3"));
        assert!(text.contains("Warnings:\n- backup before save failed"));
    }
}
