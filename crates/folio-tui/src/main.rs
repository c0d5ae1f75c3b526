//! Folio - a terminal rendition of a personal portfolio site.
//!
//! Views load lazily through an offline-first cache, reveal themselves
//! after a readiness delay, and slide between each other on navigation.

mod app;
mod network;
mod ui;

use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use folio_core::Config;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use folio_core::orchestrator::Connectivity;
use ui::input::{handle_input, handle_mouse};
use ui::render::{render, sync_layout};

// ============================================================================
// Constants
// ============================================================================

/// Log file name inside the log directory; rotated daily.
const LOG_FILE_NAME: &str = "folio.log";

/// Subdirectory of the cache dir holding logs.
const LOG_DIR: &str = "logs";

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    /// Install and activate the offline cache, then exit.
    precache: bool,
    /// Print the offline cache status, then exit.
    cache_status: bool,
    /// Write the config file (defaults merged with any existing file), then exit.
    init_config: bool,
    /// Route to open at startup.
    path: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--precache" => parsed.precache = true,
            "--cache-status" => parsed.cache_status = true,
            "--init-config" => parsed.init_config = true,
            "--path" => {
                let path = iter.next().context("--path needs a route, e.g. --path /contact")?;
                parsed.path = Some(path.clone());
            }
            other => bail!("Unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

/// Initialize the tracing subscriber. Logs go to a file because the
/// terminal belongs to the UI. Use RUST_LOG to change the level.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    guard
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.apply_env();
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let log_dir = Config::default()
        .cache_dir()
        .map(|dir| dir.join(LOG_DIR))
        .unwrap_or_else(|_| std::env::temp_dir().join("folio"));
    let _guard = init_tracing(&log_dir);

    if args.init_config {
        let config = Config::load().context("Failed to read existing config")?;
        config.save().context("Failed to write config")?;
        eprintln!("Config written");
        return Ok(());
    }

    let config = load_config();
    info!("Folio starting");

    if args.precache || args.cache_status {
        return run_cache_command(&config, args.precache).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match App::new(config, args.path.as_deref()) {
        Ok(mut app) => {
            app.register_offline_cache();
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e),
    };

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

    info!("Folio shutting down");
    Ok(())
}

/// `--precache` and `--cache-status`: print the cache status as JSON.
async fn run_cache_command(config: &Config, install: bool) -> Result<()> {
    let origin = network::origin(config)?
        .context("No origin configured; set FOLIO_ORIGIN or `origin` in config.json")?;
    let worker = network::start_worker(config, origin, Connectivity::default())?;

    if install {
        eprintln!("Precaching {} resources...", config.offline.manifest.len());
        worker.register().await?;
    }
    let status = worker.status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let frame_interval = app.config.orchestrator.frame_interval();
    loop {
        let size = terminal.size()?;
        sync_layout(app, Rect::new(0, 0, size.width, size.height));

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events, at most one frame, so animations keep moving
        if event::poll(frame_interval)? {
            match event::read()? {
                Event::Key(key) => {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Ok(());
                    }

                    if handle_input(app, key)? {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }

        // Advance animations and collect background results
        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&[]).expect("parse"), CliArgs::default());

        let parsed = parse_args(&args(&["--precache", "--path", "/contact"])).expect("parse");
        assert!(parsed.precache);
        assert!(!parsed.cache_status);
        assert!(!parsed.init_config);
        assert_eq!(parsed.path.as_deref(), Some("/contact"));
    }

    #[test]
    fn test_parse_args_rejects_unknown_and_missing_values() {
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["--path"])).is_err());
    }
}
