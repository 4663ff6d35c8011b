use std::path::Path;
use std::time::Duration as STDDuration;

use anyhow::Result;
use humantime::format_duration;
use prettytable::Table;
use rusqlite::Connection;

use crate::config::{Settings, SettingsDraft};
use crate::model;

pub fn add_task(db: Connection, name: String, priority: i64) -> Result<()> {
    match model::add_task(&db, &name, priority)? {
        Some(task) => println!("{}. {} (priority {})", task.id, task.name, task.priority),
        None => println!("Nothing added: the task name is empty."),
    }
    Ok(())
}

pub fn list(db: Connection) -> Result<()> {
    let tasks = model::list_tasks(&db)?;

    if tasks.is_empty() {
        println!("No tasks yet. Use 'pomo add' to create one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row!["id", "task", "priority", "done", "sessions", "created"]);
    for task in tasks {
        table.add_row(row![
            task.id,
            task.name,
            task.priority,
            if task.completed { "yes" } else { "" },
            task.pomodoro_sessions,
            task.created_at.format("%Y-%m-%d %H:%M").to_string()
        ]);
    }
    table.printstd();

    Ok(())
}

/// Apply staged settings edits, or print the current settings when
/// nothing was staged.
pub fn configure(settings_path: &Path, draft: SettingsDraft) -> Result<()> {
    let mut settings = Settings::load_or_default(settings_path);

    if !draft.is_empty() {
        draft.commit(&mut settings);
        settings.save(settings_path)?;
    }

    println!(
        "focus: {}",
        format_duration(STDDuration::from_secs(settings.focus_minutes * 60))
    );
    println!(
        "short break: {}",
        format_duration(STDDuration::from_secs(settings.short_break_minutes * 60))
    );
    println!(
        "long break: {}",
        format_duration(STDDuration::from_secs(settings.long_break_minutes * 60))
    );
    println!("alert: {}", if settings.mute { "muted" } else { "on" });

    Ok(())
}
