//! Wellness Tracker - Log sleep, gratitude and movement each day and watch
//! the streak grow.

mod app;
mod autosave;
mod celebrate;
mod config;
mod dates;
mod logging;
mod models;
mod stats;
mod storage;
mod store;
mod streak;
mod ui;

use app::App;
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use storage::EntryPersistence;

const TICK_RATE: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let _log_guard = logging::init(&config.logging)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting wellness tracker");

    // First run: write the defaults.
    if Config::config_path().is_some_and(|p| !p.exists()) {
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "Could not write default config");
        }
    }

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);
    app.flush();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "Exited with error");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    tracing::info!("Shut down cleanly");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend, P: EntryPersistence>(
    terminal: &mut Terminal<B>,
    app: &mut App<P>,
) -> anyhow::Result<()> {
    loop {
        app.tick(Instant::now(), dates::today());
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(app.poll_timeout(Instant::now(), TICK_RATE))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.code == KeyCode::Char('q') && key.modifiers.is_empty() && !app.is_editing() {
                break;
            }
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
