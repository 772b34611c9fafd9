//! Futebol 1X2 TUI: six-panel terminal dashboard with vim-style navigation.
//!
//! Panels:
//! 1. Dashboard: health, latest results, quick actions
//! 2. Data: API fetch, CSV upload and preview
//! 3. Training: train, evaluate, classification report
//! 4. Backtest: time-split folds and export
//! 5. Predictions: 1X2 table, filters, export
//! 6. About: methodology and keys

use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use futebol_core::config::Config;
use futebol_core::store::ViewStore;
use futebol_core::transport;

use futebol_tui::clipboard::SystemClipboard;
use futebol_tui::worker::{self, WorkerCommand};
use futebol_tui::{input, logging, persistence, ui, AppState};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableBracketedPaste, LeaveAlternateScreen);
        default_hook(info);
    }));

    // Logging is best effort; the dashboard works without it.
    if let Err(e) = logging::init(&logging::default_path()) {
        eprintln!("warning: file logging disabled: {e:#}");
    }

    let config = Config::load(None).context("loading configuration")?;
    let backend = transport::from_config(&config).context("creating backend")?;
    let store = match config.state_path() {
        Some(path) => ViewStore::open(path),
        None => ViewStore::in_memory(),
    };

    // Load persisted preferences
    let prefs_path = persistence::default_path();
    let persisted = persistence::load(&prefs_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    // Spawn worker
    let backend_name = backend.name().to_string();
    let worker_handle =
        worker::spawn_worker(backend, cmd_rx, resp_tx).context("starting worker thread")?;

    // Build app state
    let mut app = AppState::new(
        config,
        store,
        backend_name,
        cmd_tx.clone(),
        resp_rx,
        Box::new(SystemClipboard::new()),
    );
    persistence::apply(&mut app, persisted);
    app.check_health();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Save preferences before exit
    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&prefs_path, &persisted) {
        tracing::warn!(error = %e, "saving preferences failed");
    }

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
