use std::collections::HashSet;

use chrono::Local;
use thiserror::Error;

use super::{
    model::{NewTask, SortDirection, UpdateTask},
    repository::Snapshot,
};
use crate::{
    datetime,
    task::{Task, TaskId},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Task content cannot be empty")]
    EmptyContent,

    #[error("No date has been set for this reminder")]
    MissingDate,

    #[error("No time has been set for this reminder")]
    MissingTime,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No task with id {0}")]
    NotFound(TaskId),

    #[error("Task ids are exhausted")]
    IdsExhausted,
}

pub fn validate(
    content: &str,
    display_date: &str,
    display_time: &str,
) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if display_date.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    if display_time.is_empty() {
        return Err(ValidationError::MissingTime);
    }

    Ok(())
}

/// Ordered, in-memory task list. Ids come from a counter that never goes back,
/// so an id freed by deletion is never handed out again.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Fails when a stored id leaves no room for the next one.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let Snapshot { mut tasks, next_id } = snapshot;
        for task in &mut tasks {
            task.selected = false;
        }
        let next_id = next_id_after(&tasks, next_id).ok_or(StoreError::IdsExhausted)?;

        Ok(Self { tasks, next_id })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            next_id: self.next_id,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn add(&mut self, new_task: NewTask) -> Result<Task, StoreError> {
        validate(
            &new_task.content,
            &new_task.display_date,
            &new_task.display_time,
        )?;
        let following_id = self.next_id.checked_add(1).ok_or(StoreError::IdsExhausted)?;

        let task = Task {
            id: self.next_id,
            content: new_task.content,
            display_date: new_task.display_date,
            display_time: new_task.display_time,
            created_at: datetime::format_created_at(&Local::now()),
            due: new_task.due,
            selected: false,
        };
        self.next_id = following_id;
        self.tasks.push(task.clone());

        log::info!("Added task. [task_id = {}, due = {}]", task.id, task.due.millis());
        Ok(task)
    }

    /// Rewrites content, date, time and due instant. Id and creation stamp are kept.
    pub fn edit(&mut self, update: UpdateTask) -> Result<&Task, StoreError> {
        validate(&update.content, &update.display_date, &update.display_time)?;

        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == update.id)
            .ok_or(StoreError::NotFound(update.id))?;

        task.content = update.content;
        task.display_date = update.display_date;
        task.display_time = update.display_time;
        task.due = update.due;

        log::info!("Edited task. [task_id = {}, due = {}]", task.id, task.due.millis());
        Ok(task)
    }

    /// Removes every task whose id is in `ids` and returns how many remain.
    pub fn delete(&mut self, ids: &HashSet<TaskId>) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !ids.contains(&task.id));
        let after = self.tasks.len();

        if before != after {
            log::info!("Deleted {} tasks. [remaining = {}]", before - after, after);
        }

        after
    }

    pub fn sorted(&self, direction: SortDirection) -> Vec<Task> {
        let mut sorted = self.tasks.clone();
        match direction {
            SortDirection::Ascending => sorted.sort_by_key(|task| task.id),
            SortDirection::Descending => sorted.sort_by_key(|task| std::cmp::Reverse(task.id)),
        }
        sorted
    }

    /// Flips the selection flag and returns the new value.
    pub fn toggle_selection(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.selected = !task.selected;
        Some(task.selected)
    }

    pub fn clear_selection(&mut self) {
        for task in &mut self.tasks {
            task.selected = false;
        }
    }

    pub fn selected_ids(&self) -> HashSet<TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.selected)
            .map(|task| task.id)
            .collect()
    }
}

/// `floor` raised past every id in `tasks`. `None` when some id has no successor.
pub(crate) fn next_id_after(tasks: &[Task], floor: TaskId) -> Option<TaskId> {
    tasks.iter().try_fold(floor.max(1), |next, task| {
        task.id.checked_add(1).map(|after| next.max(after))
    })
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
