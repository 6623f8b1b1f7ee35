use async_trait::async_trait;
use thiserror::Error;

use super::delivery::Notification;
use crate::task::{DueInstant, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    /// Fires at the due instant, even while idle.
    Exact,
    /// Best effort. May fire later than the due instant.
    Inexact,
}

#[derive(Debug, Clone)]
pub struct Alarm {
    pub at: DueInstant,
    pub notification: Notification,
}

impl Alarm {
    pub fn id(&self) -> TaskId {
        self.notification.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAlarm {
    pub id: TaskId,
    pub fire_at: DueInstant,
    pub kind: AlarmKind,
}

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("Exact alarm refused by the platform: {0}")]
    ExactRefused(String),
}

/// One-shot wake-capable triggers keyed by task id.
/// Registering an id that is already pending replaces the earlier trigger.
#[async_trait]
pub trait AlarmFacility: Send + Sync + 'static {
    async fn set_exact(&self, alarm: Alarm) -> Result<(), AlarmError>;

    async fn set_inexact(&self, alarm: Alarm) -> Result<(), AlarmError>;

    /// Returns whether a pending trigger was removed.
    async fn cancel(&self, id: TaskId) -> bool;

    async fn cancel_all(&self) -> usize;

    async fn pending(&self) -> Vec<PendingAlarm>;
}
