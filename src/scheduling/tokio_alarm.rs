use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::{sync::RwLock, task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use super::{
    alarm::{Alarm, AlarmError, AlarmFacility, AlarmKind, PendingAlarm},
    delivery::NotificationPresenter,
};
use crate::task::{DueInstant, TaskId};

pub const DEFAULT_MAX_EXACT_ALARMS: usize = 500;
pub const DEFAULT_INEXACT_WINDOW: Duration = Duration::from_secs(60);

const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

struct ScheduledAlarm {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
    fire_at: DueInstant,
    kind: AlarmKind,
}

impl ScheduledAlarm {
    fn is_pending(&self) -> bool {
        !self.task.is_finished()
    }

    /// A notification that is already being presented is allowed to finish.
    async fn cancel(self, timeout: Duration) -> bool {
        let was_pending = self.is_pending();
        self.cancellation_token.cancel();
        let _ = time::timeout(timeout, self.task).await;
        was_pending
    }
}

/// In-process alarm service: every alarm is a task sleeping until its instant.
pub struct TokioAlarmFacility {
    alarms: RwLock<HashMap<TaskId, ScheduledAlarm>>,
    presenter: Arc<dyn NotificationPresenter>,
    max_exact: usize,
    inexact_window: Duration,
}

impl TokioAlarmFacility {
    pub fn new(presenter: Arc<dyn NotificationPresenter>) -> Self {
        Self {
            alarms: RwLock::new(HashMap::new()),
            presenter,
            max_exact: DEFAULT_MAX_EXACT_ALARMS,
            inexact_window: DEFAULT_INEXACT_WINDOW,
        }
    }

    /// Exact registrations beyond this many pending exact alarms are refused.
    pub fn with_max_exact(mut self, max_exact: usize) -> Self {
        self.max_exact = max_exact;
        self
    }

    pub fn with_inexact_window(mut self, inexact_window: Duration) -> Self {
        self.inexact_window = inexact_window;
        self
    }

    async fn register(&self, alarm: Alarm, kind: AlarmKind) -> Result<(), AlarmError> {
        let id = alarm.id();
        let mut alarms = self.alarms.write().await;
        alarms.retain(|_, scheduled| scheduled.is_pending());

        if kind == AlarmKind::Exact {
            let exact_pending = alarms
                .iter()
                .filter(|(other, scheduled)| **other != id && scheduled.kind == AlarmKind::Exact)
                .count();
            if exact_pending >= self.max_exact {
                return Err(AlarmError::ExactRefused(format!(
                    "{exact_pending} exact alarms pending, limit is {}",
                    self.max_exact
                )));
            }
        }

        if let Some(previous) = alarms.remove(&id) {
            previous.cancel(CANCEL_TIMEOUT).await;
            log::debug!("Replaced pending alarm. [task_id = {id}]");
        }

        let fire_at = match kind {
            AlarmKind::Exact => alarm.at,
            AlarmKind::Inexact => align_up(alarm.at, self.inexact_window),
        };
        let scheduled = self.spawn_alarm(alarm, fire_at, kind);
        alarms.insert(id, scheduled);

        log::info!(
            "Registered alarm. [task_id = {id}, kind = {kind:?}, fire_at = {}]",
            fire_at.millis()
        );
        Ok(())
    }

    fn spawn_alarm(&self, alarm: Alarm, fire_at: DueInstant, kind: AlarmKind) -> ScheduledAlarm {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let presenter = Arc::clone(&self.presenter);
        let delay = delay_until(fire_at, Utc::now());

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = task_cancellation_token.cancelled() => {
                    log::debug!("Alarm cancelled before firing. [task_id = {}]", alarm.id());
                },
                _ = time::sleep(delay) => {
                    log::info!("Alarm fired. [task_id = {}]", alarm.id());
                    presenter.present(&alarm.notification).await;
                }
            }
        });

        ScheduledAlarm {
            task,
            cancellation_token,
            fire_at,
            kind,
        }
    }
}

impl Drop for TokioAlarmFacility {
    fn drop(&mut self) {
        for scheduled in self.alarms.get_mut().values() {
            scheduled.cancellation_token.cancel();
        }
    }
}

#[async_trait]
impl AlarmFacility for TokioAlarmFacility {
    async fn set_exact(&self, alarm: Alarm) -> Result<(), AlarmError> {
        self.register(alarm, AlarmKind::Exact).await
    }

    async fn set_inexact(&self, alarm: Alarm) -> Result<(), AlarmError> {
        self.register(alarm, AlarmKind::Inexact).await
    }

    async fn cancel(&self, id: TaskId) -> bool {
        let removed = self.alarms.write().await.remove(&id);
        match removed {
            Some(scheduled) => scheduled.cancel(CANCEL_TIMEOUT).await,
            None => false,
        }
    }

    async fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.alarms.write().await.drain().collect();
        let mut cancelled = 0;
        for (_, scheduled) in drained {
            if scheduled.cancel(CANCEL_TIMEOUT).await {
                cancelled += 1;
            }
        }
        cancelled
    }

    async fn pending(&self) -> Vec<PendingAlarm> {
        let alarms = self.alarms.read().await;
        let mut pending: Vec<_> = alarms
            .iter()
            .filter(|(_, scheduled)| scheduled.is_pending())
            .map(|(id, scheduled)| PendingAlarm {
                id: *id,
                fire_at: scheduled.fire_at,
                kind: scheduled.kind,
            })
            .collect();
        pending.sort_by_key(|alarm| alarm.id);
        pending
    }
}

/// Zero for instants already in the past, so overdue alarms fire immediately.
pub(crate) fn delay_until(fire_at: DueInstant, now: DateTime<Utc>) -> Duration {
    let millis = fire_at.millis().saturating_sub(now.timestamp_millis());
    Duration::from_millis(u64::try_from(millis).unwrap_or(0))
}

/// Rounds up to the next multiple of `window` since the epoch.
pub(crate) fn align_up(at: DueInstant, window: Duration) -> DueInstant {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    if window_ms == 0 {
        return at;
    }

    let remainder = at.millis().rem_euclid(window_ms);
    if remainder == 0 {
        at
    } else {
        DueInstant::from_millis(at.millis() - remainder + window_ms)
    }
}
