//! Snapshots of the data file.
//!
//! Before the data file is re-read or overwritten, its current bytes are
//! copied into the backup directory as `todo_<YYYYMMDDHHMMSS>.bak`. A second
//! snapshot within the same second gets a sequence suffix
//! (`todo_<YYYYMMDDHHMMSS>_01.bak`), so names stay unique and sort in
//! creation order. Retention is decided from the embedded timestamp, never
//! from filesystem mtime.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

/// File name prefix of every backup
pub const BACKUP_PREFIX: &str = "todo_";

/// File name suffix of every backup
pub const BACKUP_SUFFIX: &str = ".bak";

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Snapshot and retention manager for one backup directory
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    keep: usize,
}

impl BackupManager {
    pub fn new(dir: PathBuf, keep: usize) -> Self {
        Self { dir, keep }
    }

    pub fn for_config(config: &Config) -> Self {
        Self::new(config.backup_dir(), config.max_backups)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn keep(&self) -> usize {
        self.keep
    }

    /// Copy `source` into the backup directory, stamped with the current time.
    ///
    /// Returns `Ok(None)` when `source` does not exist.
    pub fn snapshot(&self, source: &Path) -> Result<Option<PathBuf>> {
        self.snapshot_at(source, Local::now().naive_local())
    }

    /// Same as [`snapshot`](Self::snapshot) with an explicit timestamp
    pub fn snapshot_at(&self, source: &Path, at: NaiveDateTime) -> Result<Option<PathBuf>> {
        if !source.exists() {
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)?;
        let stamp = at.format(STAMP_FORMAT).to_string();
        let (path, mut target) = self.create_unused(&stamp)?;

        let copied = File::open(source).and_then(|mut input| io::copy(&mut input, &mut target));
        drop(target);
        match copied {
            Ok(bytes) => {
                debug!("Backed up {} ({} bytes) to {}", source.display(), bytes, path.display());
                Ok(Some(path))
            }
            Err(err) => {
                let _ = fs::remove_file(&path);
                Err(Error::Io(err))
            }
        }
    }

    /// Delete all but the newest `keep` backups.
    ///
    /// Individual delete failures are logged and skipped. Returns the paths
    /// that were removed.
    pub fn prune(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for path in self.list()?.into_iter().skip(self.keep) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Pruned backup {}", path.display());
                    removed.push(path);
                }
                Err(err) => warn!("Could not prune backup {}: {}", path.display(), err),
            }
        }
        Ok(removed)
    }

    /// Snapshot `source`, then prune. Pruning only runs after a successful copy.
    pub fn snapshot_and_prune(&self, source: &Path) -> Result<Option<PathBuf>> {
        let snapshot = self.snapshot(source)?;
        if snapshot.is_some() {
            if let Err(err) = self.prune() {
                warn!("Could not prune backups in {}: {}", self.dir.display(), err);
            }
        }
        Ok(snapshot)
    }

    /// Backups in this directory, newest first
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let pattern = glob::Pattern::new(&format!("{BACKUP_PREFIX}*{BACKUP_SUFFIX}"))
            .map_err(|err| Error::InvalidConfig(format!("backup pattern: {err}")))?;

        let mut backups: Vec<(BackupKey, PathBuf)> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                if !pattern.matches(name) {
                    return None;
                }
                let key = backup_key(name)?;
                Some((key, path))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    fn create_unused(&self, stamp: &str) -> Result<(PathBuf, File)> {
        let mut sequence = 0u32;
        loop {
            let path = self.dir.join(backup_name(stamp, sequence));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => sequence += 1,
                Err(err) => return Err(Error::Io(err)),
            }
        }
    }
}

/// Sort key embedded in a backup name: timestamp, then sequence
type BackupKey = (NaiveDateTime, u32);

fn backup_name(stamp: &str, sequence: u32) -> String {
    if sequence == 0 {
        format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}")
    } else {
        format!("{BACKUP_PREFIX}{stamp}_{sequence:02}{BACKUP_SUFFIX}")
    }
}

fn backup_key(name: &str) -> Option<BackupKey> {
    let body = name.strip_prefix(BACKUP_PREFIX)?.strip_suffix(BACKUP_SUFFIX)?;
    let (stamp, sequence) = match body.split_once('_') {
        Some((stamp, sequence)) => (stamp, sequence.parse().ok()?),
        None => (body, 0),
    };
    if stamp.len() != 14 {
        return None;
    }
    let at = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
    Some((at, sequence))
}
