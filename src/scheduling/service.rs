use chrono::{DateTime, Utc};

use super::scheduler::{ReminderScheduler, ScheduleOutcome, SchedulingError};
use crate::task::{Task, TaskId};

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Reminded On:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResyncReport {
    pub exact: usize,
    pub inexact: usize,
    pub skipped_past: usize,
}

impl ResyncReport {
    pub fn scheduled(&self) -> usize {
        self.exact + self.inexact
    }
}

/// Background reminder service. Every start re-reads the whole task list and
/// registers a trigger for each task that is still due in the future.
pub struct ReminderService {
    scheduler: ReminderScheduler,
    title_prefix: String,
    running: bool,
}

impl ReminderService {
    pub fn new(scheduler: ReminderScheduler) -> Self {
        Self {
            scheduler,
            title_prefix: DEFAULT_NOTIFICATION_TITLE.to_owned(),
            running: false,
        }
    }

    pub fn with_title_prefix(mut self, title_prefix: impl Into<String>) -> Self {
        self.title_prefix = title_prefix.into();
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub async fn start(&mut self, tasks: &[Task]) -> Result<ResyncReport, SchedulingError> {
        self.start_at(tasks, Utc::now()).await
    }

    /// Stops at the first permission denial; the permission request is made once.
    pub async fn start_at(
        &mut self,
        tasks: &[Task],
        now: DateTime<Utc>,
    ) -> Result<ResyncReport, SchedulingError> {
        let mut report = ResyncReport::default();

        for task in tasks {
            if !task.due.is_after(now) {
                report.skipped_past += 1;
                continue;
            }

            let outcome = self
                .scheduler
                .schedule(
                    task.id,
                    task.due,
                    task.notification_title(&self.title_prefix),
                    task.content.clone(),
                )
                .await?;

            match outcome {
                ScheduleOutcome::Exact => report.exact += 1,
                ScheduleOutcome::Inexact => report.inexact += 1,
            }
        }

        self.running = true;
        log::info!(
            "Reminder service started. [exact = {}, inexact = {}, skipped_past = {}]",
            report.exact,
            report.inexact,
            report.skipped_past
        );

        Ok(report)
    }

    pub async fn stop(&mut self) -> usize {
        let cancelled = self.scheduler.cancel_all().await;
        self.running = false;
        log::info!("Reminder service stopped. [cancelled = {cancelled}]");
        cancelled
    }

    pub async fn restart(&mut self, tasks: &[Task]) -> Result<ResyncReport, SchedulingError> {
        self.stop().await;
        self.start(tasks).await
    }

    pub async fn cancel(&self, task_id: TaskId) -> bool {
        self.scheduler.cancel(task_id).await
    }
}
