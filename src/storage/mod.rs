mod json_repository;
mod model;
mod repository;
mod task_store;

pub use json_repository::JsonFileRepository;
pub use model::{NewTask, SortDirection, UpdateTask};
pub use repository::{InMemoryTaskRepository, PersistenceError, Snapshot, TaskRepository};
pub use task_store::{StoreError, TaskStore, ValidationError, validate};
