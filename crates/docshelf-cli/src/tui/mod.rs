//! docshelf TUI
//!
//! Terminal browser for docshelf documents.
//!
//! ## Layout
//!
//! Two-pane layout:
//! - Left: Sections as a collapsible accordion, labels underneath
//! - Right: The selected document
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down (scroll in the document pane)
//! - h/l, ←/→ or Tab: Switch focus between panes
//! - Enter/Space: Expand a section / open a document
//! - o: Open the document in the system browser
//! - r: Refresh
//! - q: Quit
//!
//! ## Forms
//!
//! - u: Upload, e: Replace, d: Delete
//! - Tab/Shift-Tab: Next/previous field
//! - Enter: Submit, Esc: Cancel

mod app;
mod ui;

use std::fs::{self, File};
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docshelf_core::Config;

use app::{App, FormKind};

use crate::commands::open_navigator;
use crate::LOG_ENV;

/// Run the TUI application
pub fn run(config: Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if DOCSHELF_LOG is set)
    init_tui_logging(&config);

    // Templates are loaded before the terminal is touched so a broken
    // template set is reported on a normal screen
    let nav = open_navigator(&config)?;
    let mut app = App::new(nav, config.title.clone());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Dispatch a key press
///
/// Errors returned from here end the session; they only come from a
/// template set that cannot render.
fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    if app.form.is_some() {
        handle_form_mode(app, key.code)
    } else {
        handle_normal_mode(app, key.code)
    }
}

/// Handle key events while browsing
fn handle_normal_mode(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),

        KeyCode::Char('h')
        | KeyCode::Char('l')
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Tab
        | KeyCode::BackTab => app.switch_pane(),

        KeyCode::Enter | KeyCode::Char(' ') => app.activate()?,

        KeyCode::Char('u') => app.begin(FormKind::Upload)?,
        KeyCode::Char('e') => app.begin(FormKind::Edit)?,
        KeyCode::Char('d') => app.begin(FormKind::Delete)?,

        KeyCode::Char('o') => app.open_in_browser()?,
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
    Ok(())
}

/// Handle key events while a form is open
fn handle_form_mode(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Esc => return app.cancel_form(),
        KeyCode::Enter => return app.submit_form(),
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        return Ok(());
    };
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Backspace => form.delete_char(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
    Ok(())
}

/// Initialize logging for TUI mode
///
/// Only initializes if DOCSHELF_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("docshelf_core={},docshelf={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
