//! Tasklight - a terminal client for a hosted todo service.
//!
//! The app signs a user in against the service's auth endpoint, keeps
//! the session credential locally so restarts stay signed in, and
//! manages the todo list through the service's resource endpoint.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod ui;
mod utils;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use config::Config;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the cache directory
const LOG_FILE: &str = "tasklight.log";

/// Initialize the tracing subscriber.
///
/// Logs go to a file in the cache directory so they do not tear the
/// TUI. Use the RUST_LOG env var to control the level.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Ok(dir) = Config::cache_dir() else {
        return None;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    info!("Tasklight starting");

    let mut app = App::new()?;

    // CLI pre-auth flow: sign in before entering the TUI.
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        cli_login(&app).await?;
    } else {
        app.start_hydration();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Tasklight shutting down");
    Ok(())
}

/// Interactive sign-in on the plain terminal. The session phase is
/// settled (one way or the other) by the time the TUI starts, so the
/// gate routes directly to the right screen.
async fn cli_login(app: &App) -> Result<()> {
    app.session.hydrate().await;
    if app.session.is_authenticated() {
        println!("Already signed in.");
        return Ok(());
    }

    println!("\n=== Tasklight Login ===\n");

    let default_email = app.config.last_email.clone().unwrap_or_default();
    if default_email.is_empty() {
        print!("Email: ");
    } else {
        print!("Email [{}]: ", default_email);
    }
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let mut email = email.trim().to_string();
    if email.is_empty() {
        email = default_email;
    }

    let password = rpassword::prompt_password("Password: ")?;

    println!("\nSigning in...");
    if app.session.login(&email, &password).await {
        println!("Login successful.\n");
    } else {
        println!("Login failed. You can retry from the login screen.\n");
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Keep the displayed screen consistent with the latest session
        // phase before every draw.
        app.apply_gate();

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks().await;

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
