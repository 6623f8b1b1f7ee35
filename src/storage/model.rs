use serde::{Deserialize, Serialize};

use crate::task::{DueInstant, Task, TaskId};

pub struct NewTask {
    pub content: String,
    pub display_date: String,
    pub display_time: String,
    pub due: DueInstant,
}

pub struct UpdateTask {
    pub id: TaskId,
    pub content: String,
    pub display_date: String,
    pub display_time: String,
    pub due: DueInstant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Durable form of a [`Task`]. The selection flag is not part of it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub content: String,
    pub date: String,
    pub time: String,
    pub created_at: String,
    pub due: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDocument {
    pub tasks: Vec<TaskRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<TaskId>,
}

impl From<&Task> for TaskRecord {
    fn from(value: &Task) -> Self {
        Self {
            id: value.id,
            content: value.content.clone(),
            date: value.display_date.clone(),
            time: value.display_time.clone(),
            created_at: value.created_at.clone(),
            due: value.due.millis(),
        }
    }
}

impl From<TaskRecord> for Task {
    fn from(value: TaskRecord) -> Self {
        Self {
            id: value.id,
            content: value.content,
            display_date: value.date,
            display_time: value.time,
            created_at: value.created_at,
            due: DueInstant::from_millis(value.due),
            selected: false,
        }
    }
}
