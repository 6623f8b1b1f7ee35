use std::{sync::Arc, time::Duration};

use super::*;
use crate::{
    task::DueInstant,
    test_utils::{
        RecordingPresenter, TestPermissionGate, due_in_secs, notification, task_due_in, wait_secs,
    },
};

struct TestContext {
    presenter: RecordingPresenter,
    gate: Arc<TestPermissionGate>,
    facility: Arc<TokioAlarmFacility>,
}

impl TestContext {
    fn new() -> Self {
        Self::build(TestPermissionGate::granted(), |facility| facility)
    }

    fn denied() -> Self {
        Self::build(TestPermissionGate::denied(), |facility| facility)
    }

    fn with_facility(configure: impl FnOnce(TokioAlarmFacility) -> TokioAlarmFacility) -> Self {
        Self::build(TestPermissionGate::granted(), configure)
    }

    fn build(
        gate: TestPermissionGate,
        configure: impl FnOnce(TokioAlarmFacility) -> TokioAlarmFacility,
    ) -> Self {
        let presenter = RecordingPresenter::default();
        let facility = configure(TokioAlarmFacility::new(Arc::new(presenter.clone())));

        Self {
            presenter,
            gate: Arc::new(gate),
            facility: Arc::new(facility),
        }
    }

    fn scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(self.facility.clone(), self.gate.clone())
    }

    fn service(&self) -> ReminderService {
        ReminderService::new(self.scheduler())
    }

    async fn pending_ids(&self) -> Vec<i64> {
        self.facility
            .pending()
            .await
            .into_iter()
            .map(|alarm| alarm.id)
            .collect()
    }
}

fn alarm(id: i64, at: DueInstant, message: &str) -> Alarm {
    Alarm {
        at,
        notification: notification(id, message),
    }
}

#[tokio::test(start_paused = true)]
async fn exact_alarm_fires_once_at_due_instant() {
    let ctx = TestContext::new();

    ctx.facility
        .set_exact(alarm(1, due_in_secs(600), "Buy milk"))
        .await
        .unwrap();

    wait_secs(590).await;
    assert!(ctx.presenter.received_ids().is_empty());

    wait_secs(15).await;
    assert_eq!(ctx.presenter.received_ids(), vec![1]);

    wait_secs(3600).await;
    assert_eq!(ctx.presenter.received_ids(), vec![1]);
    assert!(ctx.pending_ids().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn re_registration_replaces_the_pending_trigger() {
    let ctx = TestContext::new();

    ctx.facility
        .set_exact(alarm(1, due_in_secs(600), "old"))
        .await
        .unwrap();
    ctx.facility
        .set_exact(alarm(1, due_in_secs(1200), "new"))
        .await
        .unwrap();

    wait_secs(700).await;
    assert!(ctx.presenter.received_ids().is_empty());

    wait_secs(600).await;
    let received = ctx.presenter.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message, "new");
}

#[tokio::test(start_paused = true)]
async fn cancelled_alarm_never_fires() {
    let ctx = TestContext::new();
    ctx.facility
        .set_exact(alarm(1, due_in_secs(600), "Buy milk"))
        .await
        .unwrap();

    assert!(ctx.facility.cancel(1).await);
    assert!(!ctx.facility.cancel(1).await);

    wait_secs(1200).await;
    assert!(ctx.presenter.received_ids().is_empty());
    assert!(ctx.pending_ids().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn overdue_alarm_fires_immediately() {
    let ctx = TestContext::new();

    ctx.facility
        .set_exact(alarm(7, due_in_secs(-60), "late"))
        .await
        .unwrap();
    wait_secs(1).await;

    assert_eq!(ctx.presenter.received_ids(), vec![7]);
}

#[tokio::test(start_paused = true)]
async fn exact_registrations_past_the_limit_are_refused() {
    let ctx = TestContext::with_facility(|facility| facility.with_max_exact(1));

    ctx.facility
        .set_exact(alarm(1, due_in_secs(600), "a"))
        .await
        .unwrap();
    let refused = ctx.facility.set_exact(alarm(2, due_in_secs(600), "b")).await;
    let replaced = ctx.facility.set_exact(alarm(1, due_in_secs(900), "a")).await;

    assert!(matches!(refused, Err(AlarmError::ExactRefused(_))));
    assert!(replaced.is_ok());
    assert_eq!(ctx.pending_ids().await, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn inexact_alarm_fires_by_the_end_of_its_window() {
    let ctx = TestContext::with_facility(|facility| {
        facility.with_inexact_window(Duration::from_secs(300))
    });
    let at = due_in_secs(60);

    ctx.facility.set_inexact(alarm(3, at, "soon")).await.unwrap();

    let pending = ctx.facility.pending().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, AlarmKind::Inexact);
    assert!(pending[0].fire_at >= at);
    assert_eq!(pending[0].fire_at.millis() % 300_000, 0);

    wait_secs(362).await;
    assert_eq!(ctx.presenter.received_ids(), vec![3]);
}

#[tokio::test(start_paused = true)]
async fn missing_permission_requests_it_and_registers_nothing() {
    let ctx = TestContext::denied();

    let result = ctx
        .scheduler()
        .schedule(1, due_in_secs(600), "t".to_owned(), "m".to_owned())
        .await;

    assert!(matches!(result, Err(SchedulingError::Denied(1))));
    assert_eq!(ctx.gate.requests(), 1);
    assert!(ctx.pending_ids().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn refused_exact_alarm_falls_back_to_inexact() {
    let ctx = TestContext::with_facility(|facility| facility.with_max_exact(0));

    let outcome = ctx
        .scheduler()
        .schedule(1, due_in_secs(600), "t".to_owned(), "Buy milk".to_owned())
        .await
        .unwrap();

    assert_eq!(outcome, ScheduleOutcome::Inexact);
    let pending = ctx.facility.pending().await;
    assert_eq!(pending[0].kind, AlarmKind::Inexact);

    wait_secs(700).await;
    assert_eq!(ctx.presenter.received_ids(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn service_schedules_only_future_tasks() {
    let ctx = TestContext::new();
    let mut service = ctx.service();
    let tasks = vec![
        task_due_in(1, "past", -10),
        task_due_in(2, "soon", 10),
        task_due_in(3, "later", 20),
    ];

    let report = service.start(&tasks).await.unwrap();

    assert_eq!(
        report,
        ResyncReport {
            exact: 2,
            inexact: 0,
            skipped_past: 1
        }
    );
    assert!(service.is_running());
    assert_eq!(ctx.pending_ids().await, vec![2, 3]);
}

#[tokio::test(start_paused = true)]
async fn restart_drops_triggers_of_removed_tasks() {
    let ctx = TestContext::new();
    let mut service = ctx.service();
    service
        .start(&[task_due_in(1, "a", 10), task_due_in(2, "b", 10)])
        .await
        .unwrap();

    service.restart(&[task_due_in(1, "a", 10)]).await.unwrap();

    assert_eq!(ctx.pending_ids().await, vec![1]);
    wait_secs(11 * 60).await;
    assert_eq!(ctx.presenter.received_ids(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_every_pending_trigger() {
    let ctx = TestContext::new();
    let mut service = ctx.service();
    service
        .start(&[task_due_in(1, "a", 10), task_due_in(2, "b", 20)])
        .await
        .unwrap();

    let cancelled = service.stop().await;

    assert_eq!(cancelled, 2);
    assert!(!service.is_running());
    assert!(ctx.pending_ids().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn fired_notification_carries_title_and_content() {
    let ctx = TestContext::new();
    let mut service = ctx.service().with_title_prefix("Reminded On:");
    let task = task_due_in(4, "Water the plants", 5);

    service.start(std::slice::from_ref(&task)).await.unwrap();
    wait_secs(6 * 60).await;

    let received = ctx.presenter.received.lock().unwrap();
    assert_eq!(
        received[..],
        [Notification {
            id: 4,
            title: format!("Reminded On: {} {}", task.display_date, task.display_time),
            message: "Water the plants".to_owned(),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn denied_resync_requests_permission_once() {
    let ctx = TestContext::denied();
    let mut service = ctx.service();

    let result = service
        .start(&[task_due_in(1, "a", 10), task_due_in(2, "b", 20)])
        .await;

    assert!(matches!(result, Err(SchedulingError::Denied(1))));
    assert_eq!(ctx.gate.requests(), 1);
    assert!(!service.is_running());

    ctx.gate.grant();
    let report = service.start(&[task_due_in(1, "a", 10)]).await.unwrap();
    assert_eq!(report.exact, 1);
}

#[tokio::test(start_paused = true)]
async fn scheduler_cancel_removes_only_that_task() {
    let ctx = TestContext::new();
    let scheduler = ctx.scheduler();
    for id in [1, 2] {
        scheduler
            .schedule(id, due_in_secs(600), "t".to_owned(), "m".to_owned())
            .await
            .unwrap();
    }

    assert!(scheduler.cancel(1).await);
    assert!(!scheduler.cancel(1).await);
    assert_eq!(ctx.pending_ids().await, vec![2]);

    wait_secs(700).await;
    assert_eq!(ctx.presenter.received_ids(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn service_cancel_keeps_the_other_triggers() {
    let ctx = TestContext::new();
    let mut service = ctx.service();
    service
        .start(&[task_due_in(1, "a", 10), task_due_in(2, "b", 10)])
        .await
        .unwrap();

    assert!(service.cancel(2).await);

    assert_eq!(ctx.pending_ids().await, vec![1]);
    assert_eq!(service.scheduler().pending().await.len(), 1);
}
