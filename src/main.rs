use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use task_reminder::{
    app::{TaskEdit, TaskReminderApp},
    appsettings::AppSettings,
    cli::{Cli, Command},
    error::AppError,
    scheduling::{
        ConsolePresenter, ReminderScheduler, ReminderService, SettingsPermissionGate,
        TokioAlarmFacility,
    },
    storage::{JsonFileRepository, SortDirection},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let settings = AppSettings::new().context("Failed to load application settings")?;
    let mut app = open_app(&settings).await?;

    match cli.command {
        Command::Add {
            content,
            date,
            time,
        } => {
            let task = app.add_task(&content, date, time).await?;
            println!("Added task {} due {} {}", task.id, task.display_date, task.display_time);
        }
        Command::Edit {
            id,
            content,
            date,
            time,
        } => {
            let content = match content {
                Some(content) => content,
                None => app
                    .get(id)
                    .map(|task| task.content.clone())
                    .ok_or(AppError::NotFound(id))?,
            };
            let task = app.edit_task(id, TaskEdit { content, date, time }).await?;
            println!("Updated task {} due {} {}", task.id, task.display_date, task.display_time);
        }
        Command::Delete { ids } => {
            for id in app.select_only(ids) {
                log::warn!("Skipping unknown task. [task_id = {id}]");
            }
            let deleted = app.delete_selected().await?;
            println!("Deleted {deleted} tasks");
        }
        Command::List { ascending } => {
            if ascending {
                app.set_sort_direction(SortDirection::Ascending);
            }
            println!("{}", app.status_line());
            for task in app.sorted() {
                println!(
                    "{:>4}  {} {}  {}",
                    task.id, task.display_date, task.display_time, task.content
                );
            }
        }
        Command::Run => {
            println!("{}. Press Ctrl-C to stop.", app.status_line());
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
        }
    }

    app.shutdown().await?;
    Ok(())
}

async fn open_app(settings: &AppSettings) -> anyhow::Result<TaskReminderApp> {
    let repository = JsonFileRepository::new(settings.tasks_path())
        .with_quarantine(settings.storage.quarantine_corrupt);
    let facility = TokioAlarmFacility::new(Arc::new(ConsolePresenter))
        .with_max_exact(settings.scheduler.max_exact_alarms)
        .with_inexact_window(settings.inexact_window());
    let permission = SettingsPermissionGate::new(settings.scheduler.exact_alarms_permitted);
    let service = ReminderService::new(ReminderScheduler::new(
        Arc::new(facility),
        Arc::new(permission),
    ))
    .with_title_prefix(settings.notification.title.clone());

    let app = TaskReminderApp::open(Arc::new(repository), service)
        .await
        .with_context(|| format!("Failed to open task file {}", settings.tasks_path().display()))?;

    Ok(app)
}
