//! Task store.
//!
//! Owns the in-memory task list and the data file behind it:
//! - every load and save first snapshots the current file (see [`crate::backup`])
//! - a corrupted or invalid file resets the list to empty; the snapshot keeps
//!   the old bytes for manual recovery
//! - mutations are applied to a staged copy and only become visible after the
//!   staged copy has been written; a failed save leaves memory untouched
//! - ids come from `next_id`, which only grows, so removed ids are not reused

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup::BackupManager;
use crate::config::Config;
use crate::due;
use crate::error::{Error, Result};
use crate::schema;
use crate::task::{now_minute, sort_tasks, ListFilter, Priority, SortOrder, TaskRecord, TaskStatus};

/// Outcome of reading the data file
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of tasks now in memory
    pub loaded: usize,
    /// Snapshot taken before reading, if the file existed
    pub backup: Option<PathBuf>,
    /// Format or schema error that caused the list to be reset
    pub recovered: Option<Error>,
}

/// Fields to change with [`TaskStore::edit`]; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub content: Option<String>,
    pub priority: Option<String>,
    /// Due date input; `"none"` clears the due date
    pub due: Option<String>,
}

impl EditRequest {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.priority.is_none() && self.due.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PriorityCounts {
    pub high: usize,
    pub normal: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub done: usize,
    pub pending: usize,
    pub priority: PriorityCounts,
    pub overdue: usize,
    pub created_today: usize,
    pub completed_today: usize,
    pub created_last_7_days: usize,
    pub completed_last_7_days: usize,
}

/// The task list and its backing file
#[derive(Debug)]
pub struct TaskStore {
    config: Config,
    backups: BackupManager,
    tasks: Vec<TaskRecord>,
    next_id: u64,
    warnings: Vec<String>,
}

impl TaskStore {
    /// Create an empty store bound to `config.data_file` without reading it
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            backups: BackupManager::for_config(config),
            tasks: Vec::new(),
            next_id: 1,
            warnings: Vec::new(),
        }
    }

    /// Create a store and load the data file
    pub fn open(config: &Config) -> Result<(Self, LoadReport)> {
        let mut store = Self::new(config);
        let report = store.load()?;
        Ok((store, report))
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Id the next `add` will assign
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Non-fatal problems (failed backups, failed resets) since the last call
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Read the data file into memory.
    ///
    /// A missing file yields an empty list. A file that is not valid JSON, not
    /// an array, or contains an invalid record is replaced by `[]` and the
    /// error is returned in [`LoadReport::recovered`]. Only I/O failures while
    /// reading are returned as `Err`.
    pub fn load(&mut self) -> Result<LoadReport> {
        let path = self.config.data_file.clone();
        if !path.exists() {
            debug!("No data file at {}, starting empty", path.display());
            self.replace_tasks(Vec::new());
            return Ok(LoadReport::default());
        }

        let backup = self.backup_before("load");

        match read_collection(&path) {
            Ok(tasks) => {
                info!("Loaded {} tasks from {}", tasks.len(), path.display());
                self.replace_tasks(tasks);
                Ok(LoadReport {
                    loaded: self.tasks.len(),
                    backup,
                    recovered: None,
                })
            }
            Err(err) if err.is_corruption() => {
                warn!("Data file {} rejected: {}", path.display(), err);
                let err = match err {
                    Error::Format { message, .. } => Error::Format {
                        message,
                        backup: backup.clone(),
                    },
                    Error::Schema {
                        record,
                        field,
                        reason,
                        ..
                    } => Error::Schema {
                        record,
                        field,
                        reason,
                        backup: backup.clone(),
                    },
                    other => other,
                };
                if let Err(reset) = write_atomic(&path, b"[]") {
                    warn!("Could not reset {}: {}", path.display(), reset);
                    self.warnings
                        .push(format!("could not reset {}: {reset}", path.display()));
                }
                self.replace_tasks(Vec::new());
                Ok(LoadReport {
                    loaded: 0,
                    backup,
                    recovered: Some(err),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Write the current list to the data file.
    ///
    /// The previous file is snapshotted first. On failure the in-memory list
    /// is unchanged and the call can be retried.
    pub fn save(&mut self) -> Result<()> {
        let tasks = std::mem::take(&mut self.tasks);
        let result = self.persist(&tasks);
        self.tasks = tasks;
        result
    }

    fn persist(&mut self, tasks: &[TaskRecord]) -> Result<()> {
        self.backup_before("save");
        let path = self.config.data_file.clone();
        let written = serde_json::to_vec_pretty(tasks)
            .map_err(Error::from)
            .and_then(|json| write_atomic(&path, &json));
        match written {
            Ok(()) => {
                debug!("Saved {} tasks to {}", tasks.len(), path.display());
                Ok(())
            }
            Err(err) => {
                warn!("Save to {} failed: {}", path.display(), err);
                Err(Error::SaveFailed {
                    path,
                    source: Box::new(err),
                })
            }
        }
    }

    fn backup_before(&mut self, action: &str) -> Option<PathBuf> {
        match self.backups.snapshot_and_prune(&self.config.data_file) {
            Ok(path) => path,
            Err(err) => {
                warn!("Backup before {} failed: {}", action, err);
                self.warnings
                    .push(format!("backup before {action} failed: {err}"));
                None
            }
        }
    }

    fn replace_tasks(&mut self, tasks: Vec<TaskRecord>) {
        let max_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
        self.tasks = tasks;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a pending task and return its id
    pub fn add(&mut self, content: &str, priority: Option<&str>, due: Option<&str>) -> Result<u64> {
        let content = self.validate_content(content)?;
        let priority = priority
            .map(str::parse::<Priority>)
            .transpose()?
            .unwrap_or_default();
        let now = now_minute();
        let due_date = match due {
            Some(raw) => due::parse_due(raw, now)?,
            None => None,
        };

        let id = self.next_id;
        let mut record = TaskRecord::new(id, content, priority, now);
        record.due_date = due_date;

        let mut staged = self.tasks.clone();
        staged.push(record);
        self.persist(&staged)?;

        self.tasks = staged;
        self.next_id = id + 1;
        info!("Added task {}", id);
        Ok(id)
    }

    /// Change content, priority and/or due date.
    ///
    /// Returns `Ok(false)` without saving when the request changes nothing.
    pub fn edit(&mut self, id: u64, request: EditRequest) -> Result<bool> {
        let index = self.position(id, false)?;
        if request.is_empty() {
            return Ok(false);
        }

        let content = request
            .content
            .as_deref()
            .map(|content| self.validate_content(content))
            .transpose()?;
        let priority = request
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?;
        let now = now_minute();
        let due_date = request
            .due
            .as_deref()
            .map(|raw| due::parse_due(raw, now))
            .transpose()?;

        let mut staged = self.tasks.clone();
        let task = &mut staged[index];
        if let Some(content) = content {
            task.content = content;
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        task.modified = now;

        self.persist(&staged)?;
        self.tasks = staged;
        info!("Edited task {}", id);
        Ok(true)
    }

    /// Mark a pending task done
    pub fn done(&mut self, id: u64) -> Result<()> {
        let index = self.position(id, true)?;
        if self.tasks[index].is_done() {
            return Err(Error::AlreadyDone(id));
        }

        let mut staged = self.tasks.clone();
        let task = &mut staged[index];
        task.status = TaskStatus::Done;
        task.modified = now_minute();

        self.persist(&staged)?;
        self.tasks = staged;
        info!("Completed task {}", id);
        Ok(())
    }

    /// Delete a task and return it
    pub fn remove(&mut self, id: u64) -> Result<TaskRecord> {
        let index = self.position(id, false)?;

        let mut staged = self.tasks.clone();
        let removed = staged.remove(index);

        self.persist(&staged)?;
        self.tasks = staged;
        info!("Removed task {}", id);
        Ok(removed)
    }

    /// Delete every task and return how many were removed
    pub fn clear(&mut self) -> Result<usize> {
        if self.tasks.is_empty() {
            return Err(Error::EmptyCollection);
        }

        let count = self.tasks.len();
        self.persist(&[])?;
        self.tasks.clear();
        info!("Cleared {} tasks", count);
        Ok(count)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Case-insensitive substring match on content, in insertion order
    pub fn search(&self, keyword: &str) -> Result<Vec<&TaskRecord>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::Validation(
                "search keyword cannot be empty".to_string(),
            ));
        }
        let needle = keyword.to_lowercase();
        Ok(self
            .tasks
            .iter()
            .filter(|task| task.content.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn list(&self, filter: &ListFilter, order: SortOrder) -> Vec<&TaskRecord> {
        let mut tasks: Vec<&TaskRecord> = self
            .tasks
            .iter()
            .filter(|task| filter.matches(task))
            .collect();
        sort_tasks(&mut tasks, order);
        tasks
    }

    pub fn overdue_count(&self) -> usize {
        let now = now_minute();
        self.tasks.iter().filter(|task| task.is_overdue(now)).count()
    }

    pub fn stats(&self) -> TaskStats {
        self.stats_at(now_minute())
    }

    /// Aggregate counts relative to `now`.
    ///
    /// A done task counts as completed at its `modified` time. The trailing
    /// window covers the last seven calendar days plus today.
    pub fn stats_at(&self, now: NaiveDateTime) -> TaskStats {
        let today = now.date();
        let week_start = today - Duration::days(7);
        let mut stats = TaskStats {
            total: self.tasks.len(),
            ..TaskStats::default()
        };

        for task in &self.tasks {
            match task.priority {
                Priority::High => stats.priority.high += 1,
                Priority::Normal => stats.priority.normal += 1,
                Priority::Low => stats.priority.low += 1,
            }
            if task.is_overdue(now) {
                stats.overdue += 1;
            }

            let created = task.created.date();
            if created == today {
                stats.created_today += 1;
            }
            if created >= week_start {
                stats.created_last_7_days += 1;
            }

            if task.is_done() {
                stats.done += 1;
                let completed = task.modified.date();
                if completed == today {
                    stats.completed_today += 1;
                }
                if completed >= week_start {
                    stats.completed_last_7_days += 1;
                }
            }
        }

        stats.pending = stats.total - stats.done;
        stats
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn validate_content(&self, raw: &str) -> Result<String> {
        let content = raw.trim();
        if content.is_empty() {
            return Err(Error::Validation(
                "task content cannot be empty".to_string(),
            ));
        }
        let length = content.chars().count();
        let max = self.config.max_content_len;
        if length > max {
            return Err(Error::Validation(format!(
                "task content is {length} characters (max {max})"
            )));
        }
        Ok(content.to_string())
    }

    fn position(&self, id: u64, pending_only: bool) -> Result<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| Error::NotFound {
                id,
                available: self
                    .tasks
                    .iter()
                    .filter(|task| !pending_only || !task.is_done())
                    .map(|task| task.id)
                    .collect(),
            })
    }
}

fn read_collection(path: &Path) -> Result<Vec<TaskRecord>> {
    let bytes = fs::read(path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| Error::Format {
        message: format!("invalid JSON: {err}"),
        backup: None,
    })?;
    schema::validate_collection(value)
}

/// Write data via temp file + rename so the data file is never half-written
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Io(err));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Io(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::parse_timestamp;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TaskStore) {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::for_data_file(dir.path().join("todo.json"));
        let store = TaskStore::new(&config);
        (dir, store)
    }

    fn at(value: &str) -> NaiveDateTime {
        parse_timestamp(value).expect("timestamp")
    }

    #[test]
    fn stats_counts_windows() {
        let (_dir, mut store) = setup();
        let mut fresh = TaskRecord::new(1, "fresh".into(), Priority::High, at("2026-10-18 08:00"));
        fresh.due_date = Some(at("2026-10-18 09:00"));
        let mut finished =
            TaskRecord::new(2, "finished".into(), Priority::Low, at("2026-10-12 08:00"));
        finished.status = TaskStatus::Done;
        finished.modified = at("2026-10-18 07:00");
        let mut old = TaskRecord::new(3, "old".into(), Priority::Normal, at("2026-09-01 08:00"));
        old.status = TaskStatus::Done;
        old.modified = at("2026-09-02 08:00");
        store.replace_tasks(vec![fresh, finished, old]);

        let stats = store.stats_at(at("2026-10-18 12:00"));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(
            stats.priority,
            PriorityCounts {
                high: 1,
                normal: 1,
                low: 1
            }
        );
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.created_today, 1);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.created_last_7_days, 2);
        assert_eq!(stats.completed_last_7_days, 1);
    }

    #[test]
    fn next_id_never_decreases_on_reload() {
        let (_dir, mut store) = setup();
        store.add("one", None, None).expect("add");
        store.add("two", None, None).expect("add");
        store.remove(2).expect("remove");
        store.load().expect("reload");
        assert_eq!(store.next_id(), 3);
    }

    #[test]
    fn not_found_for_done_lists_pending_ids() {
        let (_dir, mut store) = setup();
        store.add("one", None, None).expect("add");
        store.add("two", None, None).expect("add");
        store.done(1).expect("done");
        match store.done(9) {
            Err(Error::NotFound { id, available }) => {
                assert_eq!(id, 9);
                assert_eq!(available, vec![2]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("todo.json");
        write_atomic(&path, b"[]").expect("write");
        let names: Vec<String> = fs::read_dir(path.parent().expect("parent"))
            .expect("read_dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["todo.json".to_string()]);
    }
}
