mod alarm;
mod delivery;
mod permission;
mod scheduler;
mod service;
mod tokio_alarm;

pub use alarm::{Alarm, AlarmError, AlarmFacility, AlarmKind, PendingAlarm};
pub use delivery::{ConsolePresenter, Notification, NotificationPresenter};
pub use permission::{PermissionGate, SettingsPermissionGate};
pub use scheduler::{ReminderScheduler, ScheduleOutcome, SchedulingError};
pub use service::{DEFAULT_NOTIFICATION_TITLE, ReminderService, ResyncReport};
pub use tokio_alarm::{DEFAULT_INEXACT_WINDOW, DEFAULT_MAX_EXACT_ALARMS, TokioAlarmFacility};

#[cfg(test)]
mod tests;
