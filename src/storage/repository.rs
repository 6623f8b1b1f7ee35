use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::task::{Task, TaskId};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on task file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task file {} holds an id with no successor", path.display())]
    IdsExhausted { path: PathBuf },

    #[error("Could not encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything that survives a restart: the ordered task list and the id high-water mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub next_id: TaskId,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns an empty snapshot when nothing has been saved yet.
    async fn load(&self) -> Result<Snapshot, PersistenceError>;

    /// Replaces any previously saved snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;
}

pub struct InMemoryTaskRepository {
    store: RwLock<Option<Snapshot>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        InMemoryTaskRepository {
            store: RwLock::new(None),
        }
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        InMemoryTaskRepository {
            store: RwLock::new(Some(snapshot)),
        }
    }

    pub async fn saved(&self) -> Option<Snapshot> {
        self.store.read().await.clone()
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn load(&self) -> Result<Snapshot, PersistenceError> {
        let store = self.store.read().await;
        Ok(store.clone().unwrap_or_default())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let mut store = self.store.write().await;
        *store = Some(snapshot.clone());
        log::debug!("Saved tasks in memory. [count = {}]", snapshot.tasks.len());
        Ok(())
    }
}
