use async_trait::async_trait;

use crate::task::TaskId;

/// Payload handed over at registration time. Presentation never re-reads the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: TaskId,
    pub title: String,
    pub message: String,
}

#[async_trait]
pub trait NotificationPresenter: Send + Sync + 'static {
    async fn present(&self, notification: &Notification);
}

/// Presents reminders on stdout.
pub struct ConsolePresenter;

#[async_trait]
impl NotificationPresenter for ConsolePresenter {
    async fn present(&self, notification: &Notification) {
        log::info!("Presenting notification. [task_id = {}]", notification.id);
        println!("🔔 {} | {}", notification.title, notification.message);
    }
}
