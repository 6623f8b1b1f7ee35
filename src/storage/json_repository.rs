use std::{
    collections::HashSet,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::{
    model::{TaskDocument, TaskRecord},
    repository::{PersistenceError, Snapshot, TaskRepository},
    task_store::next_id_after,
};
use crate::task::{Task, TaskId};

const CORRUPT_SUFFIX: &str = "corrupt";

/// A loaded task that disagrees with the rest of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inconsistency {
    /// `due` differs from what `date` and `time` describe.
    StaleDue(TaskId),
    UnreadableDisplay(TaskId),
    DuplicateId(TaskId),
}

pub(crate) fn inconsistencies(tasks: &[Task]) -> Vec<Inconsistency> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for task in tasks {
        if !seen.insert(task.id) {
            found.push(Inconsistency::DuplicateId(task.id));
        }
        match task.recompute_due() {
            Ok(due) if due != task.due => found.push(Inconsistency::StaleDue(task.id)),
            Ok(_) => {}
            Err(_) => found.push(Inconsistency::UnreadableDisplay(task.id)),
        }
    }

    found
}

/// Stores the task list as a single JSON document.
pub struct JsonFileRepository {
    path: PathBuf,
    quarantine_corrupt: bool,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quarantine_corrupt: false,
        }
    }

    /// Move an unreadable file aside and start empty instead of failing the load.
    pub fn with_quarantine(mut self, quarantine_corrupt: bool) -> Self {
        self.quarantine_corrupt = quarantine_corrupt;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn quarantine_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(CORRUPT_SUFFIX);
        self.path.with_file_name(name)
    }

    fn read_document(&self) -> Result<Option<TaskDocument>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_err(err)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| PersistenceError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn write_document(&self, document: &TaskDocument) -> Result<(), PersistenceError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|err| self.io_err(err))?;

        let json = serde_json::to_vec_pretty(document)?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(|err| self.io_err(err))?;
        tmp.write_all(&json).map_err(|err| self.io_err(err))?;
        tmp.flush().map_err(|err| self.io_err(err))?;
        tmp.persist(&self.path).map_err(|err| self.io_err(err.error))?;

        Ok(())
    }

    fn quarantine(&self) -> Result<PathBuf, PersistenceError> {
        let target = self.quarantine_path();
        fs::rename(&self.path, &target).map_err(|err| self.io_err(err))?;
        Ok(target)
    }

    fn io_err(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TaskRepository for JsonFileRepository {
    async fn load(&self) -> Result<Snapshot, PersistenceError> {
        let document = match self.read_document() {
            Ok(Some(document)) => document,
            Ok(None) => {
                log::info!(
                    "No task file yet, starting empty. [path = {}]",
                    self.path.display()
                );
                return Ok(Snapshot::default());
            }
            Err(error @ PersistenceError::Corrupt { .. }) if self.quarantine_corrupt => {
                let moved_to = self.quarantine()?;
                log::error!(
                    "{error}. Moved it aside and starting empty. [moved_to = {}]",
                    moved_to.display()
                );
                return Ok(Snapshot::default());
            }
            Err(error) => return Err(error),
        };

        let tasks: Vec<Task> = document.tasks.into_iter().map(Into::into).collect();
        let next_id = next_id_after(&tasks, document.next_id.unwrap_or(1)).ok_or_else(|| {
            PersistenceError::IdsExhausted {
                path: self.path.clone(),
            }
        })?;
        for issue in inconsistencies(&tasks) {
            log::warn!(
                "Loaded task is inconsistent, keeping it as stored. [issue = {issue:?}, path = {}]",
                self.path.display()
            );
        }

        log::info!(
            "Loaded tasks. [count = {}, next_id = {}, path = {}]",
            tasks.len(),
            next_id,
            self.path.display()
        );

        Ok(Snapshot { tasks, next_id })
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let document = TaskDocument {
            tasks: snapshot.tasks.iter().map(TaskRecord::from).collect(),
            next_id: Some(snapshot.next_id),
        };

        self.write_document(&document)?;
        log::debug!(
            "Saved tasks. [count = {}, path = {}]",
            snapshot.tasks.len(),
            self.path.display()
        );

        Ok(())
    }
}
