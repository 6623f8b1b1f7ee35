//! Add / edit / delete workflows over a single owned [`TaskStore`].
//!
//! Every mutation is followed by a save and a full reminder resync.

use std::{collections::BTreeSet, sync::Arc};

use crate::{
    datetime::{self, NormalizationError, NormalizedDateTime, PickedDate, PickedTime},
    error::AppError,
    scheduling::{ReminderService, ResyncReport, SchedulingError},
    storage::{NewTask, SortDirection, TaskRepository, TaskStore, UpdateTask, ValidationError},
    task::{Task, TaskId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingStatus {
    NotStarted,
    Synced(ResyncReport),
    /// Nothing is registered until permission is granted and
    /// [`TaskReminderApp::resync`] runs again.
    AwaitingPermission,
}

/// Edit dialog result. `None` keeps the task's current date or time.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub content: String,
    pub date: Option<PickedDate>,
    pub time: Option<PickedTime>,
}

pub struct TaskReminderApp {
    store: TaskStore,
    repository: Arc<dyn TaskRepository>,
    service: ReminderService,
    scheduling_status: SchedulingStatus,
    selection_mode: bool,
    sort_direction: SortDirection,
}

impl TaskReminderApp {
    /// Loads the saved tasks and starts the reminder service.
    pub async fn open(
        repository: Arc<dyn TaskRepository>,
        service: ReminderService,
    ) -> Result<Self, AppError> {
        let snapshot = repository.load().await?;
        if !service.scheduler().notifications_enabled() {
            log::warn!(
                "Notifications are disabled for this application; reminders will not be visible."
            );
        }

        let mut app = Self {
            store: TaskStore::from_snapshot(snapshot)?,
            repository,
            service,
            scheduling_status: SchedulingStatus::NotStarted,
            selection_mode: false,
            sort_direction: SortDirection::default(),
        };
        app.resync().await?;

        Ok(app)
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn scheduling_status(&self) -> &SchedulingStatus {
        &self.scheduling_status
    }

    pub fn service(&self) -> &ReminderService {
        &self.service
    }

    pub async fn add_task(
        &mut self,
        content: &str,
        date: Option<PickedDate>,
        time: Option<PickedTime>,
    ) -> Result<Task, AppError> {
        if content.is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        let date = date.ok_or(ValidationError::MissingDate)?;
        let time = time.ok_or(ValidationError::MissingTime)?;
        let normalized = datetime::normalize(date, time).inspect_err(log_unsaved)?;

        let task = self.store.add(NewTask {
            content: content.to_owned(),
            display_date: normalized.display_date,
            display_time: normalized.display_time,
            due: normalized.due,
        })?;
        self.commit().await?;

        Ok(task)
    }

    /// Fails with [`AppError::NotFound`] when no task has `id`.
    pub async fn edit_task(&mut self, id: TaskId, edit: TaskEdit) -> Result<Task, AppError> {
        if edit.content.is_empty() {
            return Err(ValidationError::EmptyContent.into());
        }
        let current = self.store.get(id).ok_or(AppError::NotFound(id))?;
        let normalized = normalize_edit(current, edit.date, edit.time).inspect_err(log_unsaved)?;

        let task = self
            .store
            .edit(UpdateTask {
                id,
                content: edit.content,
                display_date: normalized.display_date,
                display_time: normalized.display_time,
                due: normalized.due,
            })?
            .clone();
        self.commit().await?;

        Ok(task)
    }

    pub fn is_selecting(&self) -> bool {
        self.selection_mode
    }

    /// Enters selection mode with `id` selected, or leaves it and clears every selection.
    pub fn toggle_selection_mode(&mut self, id: TaskId) -> bool {
        self.selection_mode = !self.selection_mode;
        if self.selection_mode {
            self.store.toggle_selection(id);
        } else {
            self.store.clear_selection();
        }
        self.selection_mode
    }

    /// Enters selection mode with exactly `ids` selected, each at most once.
    /// Returns the ids that match no task.
    pub fn select_only(&mut self, ids: impl IntoIterator<Item = TaskId>) -> Vec<TaskId> {
        let ids: BTreeSet<TaskId> = ids.into_iter().collect();
        self.store.clear_selection();
        self.selection_mode = true;

        ids.into_iter()
            .filter(|id| self.store.toggle_selection(*id).is_none())
            .collect()
    }

    /// Flips one task's selection. Outside selection mode nothing happens.
    pub fn select(&mut self, id: TaskId) -> Option<bool> {
        if !self.selection_mode {
            return None;
        }
        self.store.toggle_selection(id)
    }

    /// Deletes the selected tasks and returns how many were removed.
    pub async fn delete_selected(&mut self) -> Result<usize, AppError> {
        if !self.selection_mode {
            return Ok(0);
        }

        let before = self.store.len();
        let remaining = self.store.delete(&self.store.selected_ids());
        self.commit().await?;
        if remaining == 0 {
            self.selection_mode = false;
        }

        Ok(before - remaining)
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort_direction = direction;
    }

    pub fn sorted(&self) -> Vec<Task> {
        self.store.sorted(self.sort_direction)
    }

    pub fn status_line(&self) -> String {
        if self.selection_mode {
            format!(
                "Currently Selecting {} Tasks",
                self.store.selected_ids().len()
            )
        } else {
            format!("Showing {} Tasks", self.store.len())
        }
    }

    /// Restarts the reminder service over the current store.
    /// A missing permission is recorded in [`SchedulingStatus`] rather than returned.
    pub async fn resync(&mut self) -> Result<&SchedulingStatus, AppError> {
        match self.service.restart(self.store.tasks()).await {
            Ok(report) => self.scheduling_status = SchedulingStatus::Synced(report),
            Err(SchedulingError::Denied(task_id)) => {
                log::warn!(
                    "Reminders wait for exact alarm permission. [first_task_id = {task_id}]"
                );
                self.scheduling_status = SchedulingStatus::AwaitingPermission;
            }
            Err(error) => return Err(error.into()),
        }

        Ok(&self.scheduling_status)
    }

    /// Flushes the store and stops every pending trigger.
    pub async fn shutdown(mut self) -> Result<(), AppError> {
        self.repository.save(&self.store.snapshot()).await?;
        self.service.stop().await;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        self.repository.save(&self.store.snapshot()).await?;
        self.resync().await?;
        Ok(())
    }
}

/// Parts left out of the edit are recovered from the stored display strings.
fn normalize_edit(
    current: &Task,
    date: Option<PickedDate>,
    time: Option<PickedTime>,
) -> Result<NormalizedDateTime, NormalizationError> {
    let date = match date {
        Some(date) => date,
        None => datetime::parse_display_date(&current.display_date)?,
    };
    let time = match time {
        Some(time) => time,
        None => datetime::parse_display_time(&current.display_time)?,
    };

    datetime::normalize(date, time)
}

fn log_unsaved(error: &NormalizationError) {
    log::error!("Task not saved, date and time could not be normalized. [error = {error}]");
}
