use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub file_name: String,
    pub quarantine_corrupt: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SchedulerSettings {
    pub exact_alarms_permitted: bool,
    pub max_exact_alarms: usize,
    pub inexact_window_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NotificationSettings {
    pub title: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub scheduler: SchedulerSettings,
    pub notification: NotificationSettings,
}

impl AppSettings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("storage.data_dir", ".")?
            .set_default("storage.file_name", "tasks.json")?
            .set_default("storage.quarantine_corrupt", true)?
            .set_default("scheduler.exact_alarms_permitted", true)?
            .set_default("scheduler.max_exact_alarms", 500)?
            .set_default("scheduler.inexact_window_secs", 60)?
            .set_default("notification.title", "Reminded On:")
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.file_name)
    }

    pub fn inexact_window(&self) -> Duration {
        Duration::from_secs(self.scheduler.inexact_window_secs)
    }
}
