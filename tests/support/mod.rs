#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;
use todo::config::Config;
use todo::store::{LoadReport, TaskStore};

pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("todo.json")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.dir.path().join("todo_backups")
    }

    pub fn config(&self) -> Config {
        Config::for_data_file(self.data_file())
    }

    pub fn open(&self) -> (TaskStore, LoadReport) {
        TaskStore::open(&self.config()).expect("open store")
    }

    pub fn store(&self) -> TaskStore {
        self.open().0
    }

    pub fn write_data(&self, contents: &str) {
        fs::write(self.data_file(), contents).expect("write data file");
    }

    pub fn read_data(&self) -> String {
        fs::read_to_string(self.data_file()).expect("read data file")
    }

    pub fn backup_count(&self) -> usize {
        match fs::read_dir(self.backup_dir()) {
            Ok(entries) => entries.filter_map(|entry| entry.ok()).count(),
            Err(_) => 0,
        }
    }

    /// Command for the todo binary bound to this environment's data file
    pub fn todo_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("todo").expect("todo binary");
        cmd.env("HOME", self.dir.path())
            .env_remove("TODO_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--file")
            .arg(self.data_file());
        cmd
    }
}
