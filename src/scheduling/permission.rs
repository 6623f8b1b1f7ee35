use std::sync::atomic::{AtomicBool, Ordering};

/// Platform capability checks for scheduling and showing reminders.
pub trait PermissionGate: Send + Sync {
    fn can_schedule_exact(&self) -> bool;

    /// Sends the user to the settings screen that grants exact alarms.
    fn request_exact_permission(&self);

    fn notifications_enabled(&self) -> bool {
        true
    }
}

/// Permission state taken from settings and flipped at runtime once the user grants it.
pub struct SettingsPermissionGate {
    exact_permitted: AtomicBool,
    notifications_enabled: bool,
}

impl SettingsPermissionGate {
    pub fn new(exact_permitted: bool) -> Self {
        Self {
            exact_permitted: AtomicBool::new(exact_permitted),
            notifications_enabled: true,
        }
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }

    pub fn grant(&self) {
        self.exact_permitted.store(true, Ordering::Relaxed);
    }

    pub fn revoke(&self) {
        self.exact_permitted.store(false, Ordering::Relaxed);
    }
}

impl PermissionGate for SettingsPermissionGate {
    fn can_schedule_exact(&self) -> bool {
        self.exact_permitted.load(Ordering::Relaxed)
    }

    fn request_exact_permission(&self) {
        log::warn!(
            "Exact alarms are not allowed. Enable \"Alarms & reminders\" in system settings."
        );
    }

    fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }
}
