mod app;
mod clipboard;
mod columns;
mod config;
mod filter;
mod input;
mod logging;
mod parse_job;
mod parser;
mod sort;
mod theme;
mod ui;
mod virtual_list;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use app::AppState;
use config::{Config, DEFAULT_CHANNEL_BUFFER};
use parse_job::{ParseOutcome, ParseWorker};

const USAGE: &str = "\
Usage: iisview [FILE]

Interactive viewer for IIS W3C extended log text.
Paste a log with Ctrl+V (or open the editor with `e`), or pass a FILE to load.

Environment:
  IISVIEW_CONFIG    config file path
  IISVIEW_TZ        display timezone (default Asia/Seoul)
  IISVIEW_OVERSCAN  rows rendered beyond the viewport
  IISVIEW_THEME     default, dracula or monochrome
  IISVIEW_LOG       tracing filter; enables the log file";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().skip(1).collect();
    let initial_file = match args.first().map(String::as_str) {
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some("-V") | Some("--version") => {
            println!("iisview {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(path) => Some(PathBuf::from(path)),
        None => None,
    };

    logging::init()?;

    // Load config
    let config = Config::load()?;
    tracing::info!(?config, "config loaded");

    let initial_text = match &initial_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };

    // Initialize state
    let (worker, mut parse_rx) =
        ParseWorker::new(config.async_parse_threshold, DEFAULT_CHANNEL_BUFFER);
    let mut state = AppState::new(&config, worker);
    if let Some(text) = &initial_text {
        state.load_text(text);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        original_hook(panic);
    }));

    // Main event loop
    let result = run_event_loop(&mut terminal, &mut state, &mut parse_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    result
}

async fn run_event_loop<'a>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState<'a>,
    parse_rx: &mut mpsc::Receiver<ParseOutcome>,
) -> Result<()> {
    loop {
        // Run debounced parse and filter work before drawing
        state.check_debounce();

        // Draw UI
        terminal.draw(|frame| {
            ui::draw(frame, state);
        })?;

        // Use tokio::select! to handle both terminal events and parse results
        tokio::select! {
            // Check for terminal input events
            _ = tokio::time::sleep(Duration::from_millis(16)) => {
                // Drain everything that is already queued
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) => {
                            // Only handle key press events (not release)
                            if key.kind == KeyEventKind::Press {
                                input::handle_key(state, key);
                            }
                        }
                        Event::Mouse(mouse) => {
                            input::handle_mouse(state, mouse);
                        }
                        Event::Paste(text) => {
                            input::handle_paste(state, &text);
                        }
                        _ => {}
                    }
                }
            }

            // Background parse finished
            Some(outcome) = parse_rx.recv() => {
                state.apply_parse(outcome);
            }
        }

        // Check if we should quit
        if state.should_quit {
            break;
        }
    }

    Ok(())
}
