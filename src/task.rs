use chrono::{DateTime, Utc};

use crate::datetime::{self, NormalizationError};

pub type TaskId = i64;

/// Absolute point in time, in epoch milliseconds, at which a task's reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueInstant(i64);

impl DueInstant {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    pub fn is_after(&self, now: DateTime<Utc>) -> bool {
        self.0 > now.timestamp_millis()
    }
}

impl From<DateTime<Utc>> for DueInstant {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    /// `DD/MM/YYYY`
    pub display_date: String,
    /// `hh:mm A.M` / `hh:mm P.M`
    pub display_time: String,
    /// `yyyy-MM-dd HH:mm:ss`, informational only.
    pub created_at: String,
    pub due: DueInstant,
    /// Selection-mode flag. Never persisted.
    pub selected: bool,
}

impl Task {
    /// Re-derives the due instant from the display strings.
    pub fn recompute_due(&self) -> Result<DueInstant, NormalizationError> {
        datetime::due_instant_of(&self.display_date, &self.display_time)
    }

    pub fn notification_title(&self, prefix: &str) -> String {
        format!("{prefix} {} {}", self.display_date, self.display_time)
    }
}
