use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{Datelike, TimeDelta, Timelike, Utc};

use crate::{
    datetime::{self, PickedDate, PickedTime},
    scheduling::{Notification, NotificationPresenter, PermissionGate},
    task::{DueInstant, Task, TaskId},
};

pub type ReceivedNotifications = Arc<Mutex<Vec<Notification>>>;

#[derive(Clone, Default)]
pub struct RecordingPresenter {
    pub received: ReceivedNotifications,
}

impl RecordingPresenter {
    pub fn received_ids(&self) -> Vec<TaskId> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|notification| notification.id)
            .collect()
    }
}

#[async_trait]
impl NotificationPresenter for RecordingPresenter {
    async fn present(&self, notification: &Notification) {
        self.received.lock().unwrap().push(notification.clone());
    }
}

pub struct TestPermissionGate {
    granted: AtomicBool,
    requests: AtomicUsize,
}

impl TestPermissionGate {
    pub fn granted() -> Self {
        Self {
            granted: AtomicBool::new(true),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn grant(&self) {
        self.granted.store(true, Ordering::Relaxed);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl PermissionGate for TestPermissionGate {
    fn can_schedule_exact(&self) -> bool {
        self.granted.load(Ordering::Relaxed)
    }

    fn request_exact_permission(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}

/// Picker values for the minute that is `minutes` from now, in the reminder offset.
pub fn picked_in(minutes: i64) -> (PickedDate, PickedTime) {
    let at = (Utc::now() + TimeDelta::minutes(minutes)).with_timezone(&datetime::reminder_offset());
    (
        PickedDate {
            year: at.year(),
            month: at.month(),
            day: at.day(),
        },
        PickedTime {
            hour: at.hour(),
            minute: at.minute(),
        },
    )
}

/// A consistent task due at the start of the minute `minutes` from now.
pub fn task_due_in(id: TaskId, content: &str, minutes: i64) -> Task {
    let (date, time) = picked_in(minutes);
    let normalized = datetime::normalize(date, time).unwrap();

    Task {
        id,
        content: content.to_owned(),
        display_date: normalized.display_date,
        display_time: normalized.display_time,
        created_at: datetime::format_created_at(&Utc::now()),
        due: normalized.due,
        selected: false,
    }
}

pub fn notification(id: TaskId, message: &str) -> Notification {
    Notification {
        id,
        title: "Reminded On:".to_owned(),
        message: message.to_owned(),
    }
}

pub fn due_in_secs(secs: i64) -> DueInstant {
    DueInstant::from(Utc::now() + TimeDelta::seconds(secs))
}

pub async fn wait_secs(secs: u64) {
    tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
}
