use thiserror::Error;

use crate::{
    datetime::NormalizationError,
    scheduling::SchedulingError,
    storage::{PersistenceError, StoreError, ValidationError},
    task::TaskId,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("No task with id {0}")]
    NotFound(TaskId),

    #[error("Task ids are exhausted")]
    IdsExhausted,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(error) => AppError::Validation(error),
            StoreError::NotFound(id) => AppError::NotFound(id),
            StoreError::IdsExhausted => AppError::IdsExhausted,
        }
    }
}
