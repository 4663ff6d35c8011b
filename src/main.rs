#[macro_use]
extern crate prettytable;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use rusqlite::Connection;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod interface;
mod model;
mod screen;
mod timer;

use crate::config::{Settings, SettingsDraft};
use crate::model::init_store;

use cli::{Command::*, CommandLineArgs};

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "gozque", "pomo")
}

fn find_default_store_file() -> Option<PathBuf> {
    if let Some(base_dirs) = project_dirs() {
        let root_dir = base_dirs.data_dir();
        if !root_dir.exists() {
            std::fs::create_dir_all(root_dir).ok()?;
        }
        let mut path = PathBuf::from(root_dir);
        path.push("db.sqlite");
        Some(path)
    } else {
        None
    }
}

fn find_settings_file() -> Option<PathBuf> {
    let base_dirs = project_dirs()?;
    Some(base_dirs.config_dir().join("settings.toml"))
}

/// Get a connection to the task store, creating and migrating the
/// schema as needed.
pub fn open_store(store_path: &Path) -> anyhow::Result<Connection> {
    let db = Connection::open(store_path)
        .with_context(|| format!("Failed to open task store at {}.", store_path.display()))?;
    init_store(&db)?;
    Ok(db)
}

/// Log to pomo.log next to the database. The screen owns the
/// terminal, so nothing is ever written to stdout or stderr here.
fn init_tracing(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let appender = tracing_appender::rolling::never(log_dir, "pomo.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

fn main() -> anyhow::Result<()> {
    // Get the command-line arguments.
    let CommandLineArgs { action, store_file } = CommandLineArgs::from_args();

    // Unpack the store file.
    let store_file = store_file
        .or_else(find_default_store_file)
        .ok_or(anyhow!("Failed to find the task store file."))?;

    let log_dir = store_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let _log_guard = init_tracing(&log_dir);

    let settings_file =
        find_settings_file().ok_or(anyhow!("Failed to find the settings file."))?;

    // Perform the action.
    match action {
        Run => {
            let settings = Settings::load_or_default(&settings_file);
            screen::run(open_store(&store_file)?, &settings)
        }
        Add { name, priority } => interface::add_task(open_store(&store_file)?, name, priority),
        List => interface::list(open_store(&store_file)?),
        Config {
            focus,
            short_break,
            long_break,
            mute,
            unmute,
        } => {
            let draft = SettingsDraft {
                focus,
                short_break,
                long_break,
                mute: if mute {
                    Some(true)
                } else if unmute {
                    Some(false)
                } else {
                    None
                },
            };
            interface::configure(&settings_file, draft)
        }
    }?;
    Ok(())
}
