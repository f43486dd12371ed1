//! Task records.
//!
//! A task is one entry of the JSON array stored in the data file. Timestamps
//! are local wall-clock minutes serialized as `YYYY-MM-DD HH:MM`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wire format of every timestamp in the data file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Accepted priority names, highest first
pub const PRIORITY_NAMES: [&str; 3] = ["high", "normal", "low"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    /// Sort rank, high priority first
    pub fn rank(self) -> usize {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(Error::Validation(format!(
                "unknown priority '{}' (expected {})",
                value.trim(),
                PRIORITY_NAMES.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            _ => Err(Error::Validation(format!(
                "unknown status '{}' (expected pending, done)",
                value.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: u64,
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(with = "timestamp")]
    pub created: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub modified: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub due_date: Option<NaiveDateTime>,
}

impl TaskRecord {
    pub fn new(id: u64, content: String, priority: Priority, now: NaiveDateTime) -> Self {
        Self {
            id,
            content,
            priority,
            status: TaskStatus::Pending,
            created: now,
            modified: now,
            due_date: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Pending with a due date strictly before `now`
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.status == TaskStatus::Pending
            && self.due_date.is_some_and(|due| crate::due::is_overdue(due, now))
    }
}

/// Current local time truncated to the minute
pub fn now_minute() -> NaiveDateTime {
    truncate_to_minute(Local::now().naive_local())
}

pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(value)
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|err| {
        Error::Validation(format!(
            "invalid timestamp '{value}' (expected YYYY-MM-DD HH:MM): {err}"
        ))
    })
}

/// Serde adapter for `YYYY-MM-DD HH:MM` timestamps
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }

    /// Nullable variant; `None` serializes as `null`
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::TIMESTAMP_FORMAT;

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => serializer.collect_str(&value.format(TIMESTAMP_FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|raw| {
                NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}

/// Filters accepted by `list`
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub created_after: Option<NaiveDate>,
}

impl ListFilter {
    pub fn matches(&self, task: &TaskRecord) -> bool {
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        if self
            .created_after
            .is_some_and(|date| task.created.date() < date)
        {
            return false;
        }
        true
    }
}

/// Display order for `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Pending first, then by priority, then by id
    #[default]
    Priority,
    /// Pending first, tasks with a due date before those without, soonest first
    Due,
    /// Ascending id (creation order)
    Id,
}

pub fn sort_tasks(tasks: &mut [&TaskRecord], order: SortOrder) {
    tasks.sort_by(|a, b| match order {
        SortOrder::Priority => status_rank(a)
            .cmp(&status_rank(b))
            .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
            .then_with(|| a.id.cmp(&b.id)),
        SortOrder::Due => status_rank(a)
            .cmp(&status_rank(b))
            .then_with(|| compare_due(a.due_date, b.due_date))
            .then_with(|| a.id.cmp(&b.id)),
        SortOrder::Id => a.id.cmp(&b.id),
    });
}

fn status_rank(task: &TaskRecord) -> usize {
    match task.status {
        TaskStatus::Pending => 0,
        TaskStatus::Done => 1,
    }
}

fn compare_due(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
