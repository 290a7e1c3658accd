//! Pasapalabra - Spanish vocabulary trainer for the terminal
//!
//! Weighted flashcards in two directions and a timed letter-wheel quiz.

mod auth;
mod catalog;
mod config;
mod logging;
mod models;
mod rosco;
mod scheduler;
mod storage;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::{info, warn};

use config::Config;
use storage::{FileDocumentStore, GameStorage};
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "pasapalabra")]
#[command(author, version, about = "Pasapalabra-style vocabulary trainer TUI", long_about = None)]
struct Args {
    /// CSV word catalog (Letra, Regla, Definición, Palabra)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Play as this user; remembered for next time
    #[arg(short, long)]
    user: Option<String>,

    /// Directory for progress, reports and logs
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "pasapalabra=trace"
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Set the password that unlocks report review for ADMIN
    #[arg(long, value_name = "PASSWORD")]
    admin_password: Option<String>,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = Config::default_path();
    let mut config = Config::load_from(&config_path).unwrap_or_default();
    if let Some(user) = args.user {
        let user = user.trim().to_string();
        config.user = if user.is_empty() { None } else { Some(user) };
        config.save_to(&config_path)?;
    }
    if let Some(password) = args.admin_password {
        config.admin_password_hash = Some(auth::hash_password(&password));
        config.save_to(&config_path)?;
    }
    if args.catalog.is_some() {
        config.catalog = args.catalog;
    }
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir;
    }

    let data_dir = config
        .data_dir
        .clone()
        .unwrap_or_else(FileDocumentStore::default_path);

    let _log_guard = logging::init(&data_dir.join("logs"), &args.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), data_dir = %data_dir.display(), "starting");

    let words = match config.catalog {
        Some(ref path) => catalog::load_catalog(path)?,
        None => catalog::bundled_catalog(),
    };
    if words.is_empty() {
        warn!("word catalog is empty");
    }

    let storage = GameStorage::open(data_dir)?;

    run_tui(storage, config, config_path, words)
}

fn run_tui(
    storage: GameStorage,
    config: Config,
    config_path: PathBuf,
    words: Vec<models::WordEntry>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(storage, config, config_path, words);

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting on error");
        eprintln!("Error: {}", err);
        return Err(err);
    }

    info!("bye");
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        app.tick(Instant::now());
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    Ok(())
}
