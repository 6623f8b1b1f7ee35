use std::sync::Arc;

use thiserror::Error;

use super::{
    alarm::{Alarm, AlarmError, AlarmFacility, PendingAlarm},
    delivery::Notification,
    permission::PermissionGate,
};
use crate::task::{DueInstant, TaskId};

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Exact alarm permission is not granted. [task_id = {0}]")]
    Denied(TaskId),

    #[error(transparent)]
    Facility(#[from] AlarmError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Exact,
    /// The platform refused an exact alarm and a best-effort one was registered instead.
    Inexact,
}

pub struct ReminderScheduler {
    facility: Arc<dyn AlarmFacility>,
    permission: Arc<dyn PermissionGate>,
}

impl ReminderScheduler {
    pub fn new(facility: Arc<dyn AlarmFacility>, permission: Arc<dyn PermissionGate>) -> Self {
        Self {
            facility,
            permission,
        }
    }

    /// Registers one trigger for `task_id`, replacing whatever was pending for it.
    pub async fn schedule(
        &self,
        task_id: TaskId,
        due: DueInstant,
        title: String,
        message: String,
    ) -> Result<ScheduleOutcome, SchedulingError> {
        if !self.permission.can_schedule_exact() {
            self.permission.request_exact_permission();
            return Err(SchedulingError::Denied(task_id));
        }

        let alarm = Alarm {
            at: due,
            notification: Notification {
                id: task_id,
                title,
                message,
            },
        };

        match self.facility.set_exact(alarm.clone()).await {
            Ok(()) => Ok(ScheduleOutcome::Exact),
            Err(AlarmError::ExactRefused(reason)) => {
                log::warn!(
                    "Exact alarm refused, using inexact. [task_id = {task_id}, reason = {reason}]"
                );
                self.facility.set_inexact(alarm).await?;
                Ok(ScheduleOutcome::Inexact)
            }
        }
    }

    pub async fn cancel(&self, task_id: TaskId) -> bool {
        self.facility.cancel(task_id).await
    }

    pub async fn cancel_all(&self) -> usize {
        self.facility.cancel_all().await
    }

    pub async fn pending(&self) -> Vec<PendingAlarm> {
        self.facility.pending().await
    }

    pub fn notifications_enabled(&self) -> bool {
        self.permission.notifications_enabled()
    }
}
