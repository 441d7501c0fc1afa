//! recipe-tui - A terminal UI for recipe databases
//!
//! Browse any SQLite file, run SQL against it and enter new recipes.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::tui::Tui;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::Event;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = "recipe.db";

#[derive(Parser, Debug)]
#[command(version, about = "Browse SQLite databases and enter recipes")]
struct Args {
    /// Database to open; defaults to the most recently used one
    db_path: Option<PathBuf>,

    /// Where to write logs (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {}", e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(Config::default_log_path);
    init_logging(&log_path)?;

    let config = Config::load();
    let db_path = args
        .db_path
        .or_else(|| config.most_recent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    info!(db = %db_path.display(), "starting recipe-tui");

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(250));
    tui.enter()?;

    let mut app = App::new(config);
    app.init()?;

    let result = open_initial(&mut app, db_path).and_then(|_| run_app(&mut tui, &mut app));

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        error!(error = %format!("{:#}", err), "recipe-tui stopped");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    info!("recipe-tui exited");
    Ok(())
}

fn open_initial(app: &mut App, db_path: PathBuf) -> Result<()> {
    dispatch(app, Action::OpenDatabase(db_path))
}

/// Apply an action and every follow-up it produces
fn dispatch(app: &mut App, action: Action) -> Result<()> {
    let mut current_action = Some(action);
    while let Some(a) = current_action {
        current_action = app.update(a)?;
    }
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            let area = frame.area();
            if let Err(e) = app.draw(frame, area) {
                error!(error = %e, "draw failed");
            }
        })?;

        match tui.next_event()? {
            Some(event) => {
                let action = match event {
                    Event::Key(key) => app.handle_key_event(key)?,
                    Event::Resize(w, h) => Some(Action::Resize(w, h)),
                    _ => None,
                };
                if let Some(action) = action {
                    dispatch(app, action)?;
                }
            }
            // No event - send a tick for time-based updates
            None => dispatch(app, Action::Tick)?,
        }
    }

    Ok(())
}
