//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{normalize_path, AppState, Field, FileTarget, Overlay, Panel, TableCmd};
use crate::tickets::Action;

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Report => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | 'r')) {
                app.overlay = Overlay::None;
            }
            return;
        }
        Overlay::ConfirmReset => {
            handle_confirm_reset(app, key);
            return;
        }
        Overlay::Edit { .. } => {
            handle_edit_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys (always available).
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            if let Some(panel) = Panel::from_index(index) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('H') => {
            app.check_health();
            return;
        }
        KeyCode::Char('X') => {
            app.overlay = Overlay::ConfirmReset;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Dashboard => handle_dashboard_key(app, key),
        Panel::Data => handle_data_key(app, key),
        Panel::Training => handle_training_key(app, key),
        Panel::Backtest => handle_backtest_key(app, key),
        Panel::Predictions => handle_predictions_key(app, key),
        Panel::About => handle_about_key(app, key),
    }
}

/// A bracketed paste: text for the open prompt, or a dropped file path.
pub fn handle_paste(app: &mut AppState, text: &str) {
    if matches!(app.overlay, Overlay::Edit { .. }) {
        app.edit_push_str(text);
        return;
    }
    let target = match app.active_panel {
        Panel::Data => FileTarget::Data,
        Panel::Predictions => FileTarget::Fixtures,
        _ => {
            app.set_warning("Paste a CSV path on the Data or Predictions panel");
            return;
        }
    };
    if let Some(path) = normalize_path(text) {
        app.select_file(target, path);
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_confirm_reset(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.overlay = Overlay::None;
            app.reset_all();
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q') => {
            app.overlay = Overlay::None;
        }
        _ => {}
    }
}

fn handle_edit_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Backspace => app.edit_backspace(),
        KeyCode::Char(c) => app.edit_push(c),
        _ => {}
    }
}

/// Keys shared by every panel with a table. Returns true if consumed.
fn handle_table_key(app: &mut AppState, key: KeyEvent) -> bool {
    let cmd = match key.code {
        KeyCode::Char('j') | KeyCode::Down => TableCmd::Down,
        KeyCode::Char('k') | KeyCode::Up => TableCmd::Up,
        KeyCode::Char('l') | KeyCode::Right => TableCmd::FocusNext,
        KeyCode::Char('h') | KeyCode::Left => TableCmd::FocusPrev,
        KeyCode::Char(']') | KeyCode::PageDown => TableCmd::NextPage,
        KeyCode::Char('[') | KeyCode::PageUp => TableCmd::PrevPage,
        KeyCode::Char('s') => TableCmd::Sort,
        KeyCode::Char('y') => TableCmd::Copy,
        _ => return false,
    };
    app.table_command(cmd);
    true
}

fn handle_dashboard_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('f') => app.start_fetch(),
        KeyCode::Char('t') => app.start_train(),
        KeyCode::Char('v') => app.start_evaluate(),
        KeyCode::Char('b') => app.start_backtest(),
        KeyCode::Char('p') => app.start_predict(),
        _ => {}
    }
}

fn handle_data_key(app: &mut AppState, key: KeyEvent) {
    if handle_table_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('L') => app.begin_edit(Field::League),
        KeyCode::Char('S') => app.begin_edit(Field::Season),
        KeyCode::Char('N') => app.begin_edit(Field::Limit),
        KeyCode::Char('T') => app.begin_edit(Field::Token),
        KeyCode::Char('o') => app.begin_edit(Field::DataPath),
        KeyCode::Char('/') => app.begin_edit(Field::PreviewSearch),
        KeyCode::Char('c') => app.clear_file(FileTarget::Data),
        KeyCode::Char('u') => app.start_upload(),
        KeyCode::Enter => app.start_fetch(),
        _ => {}
    }
}

fn handle_training_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('D') => app.begin_edit(Field::Cutoff),
        KeyCode::Char('t') | KeyCode::Char(' ') => {
            app.training.use_xgb = !app.training.use_xgb;
        }
        KeyCode::Enter => app.start_train(),
        KeyCode::Char('v') => app.start_evaluate(),
        KeyCode::Char('r') => {
            if app.store.last_evaluation().is_some() {
                app.overlay = Overlay::Report;
            } else {
                app.set_warning("No evaluation yet (press v)");
            }
        }
        _ => {}
    }
}

fn handle_backtest_key(app: &mut AppState, key: KeyEvent) {
    if handle_table_key(app, key) {
        return;
    }
    // Splits are locked while a run is in flight so the form matches it.
    let locked = app.is_pending(Action::Backtest);
    match key.code {
        KeyCode::Char('+') | KeyCode::Char('=') if !locked => app.backtest.increase_splits(),
        KeyCode::Char('-') if !locked => app.backtest.decrease_splits(),
        KeyCode::Char('t') | KeyCode::Char(' ') if !locked => {
            app.backtest.use_xgb = !app.backtest.use_xgb;
        }
        KeyCode::Enter => app.start_backtest(),
        KeyCode::Char('x') => app.export_backtest(),
        _ => {}
    }
}

fn handle_predictions_key(app: &mut AppState, key: KeyEvent) {
    if handle_table_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('o') => app.begin_edit(Field::FixturesPath),
        KeyCode::Char('c') => app.clear_file(FileTarget::Fixtures),
        KeyCode::Char('/') => app.begin_edit(Field::TeamSearch),
        KeyCode::Char('g') => app.cycle_league(),
        KeyCode::Char('x') => app.export_predictions(),
        KeyCode::Enter => app.start_predict(),
        _ => {}
    }
}

fn handle_about_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.about_scroll = app.about_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.about_scroll = app.about_scroll.saturating_sub(1);
        }
        KeyCode::Home | KeyCode::Char('g') => app.about_scroll = 0,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crossterm::event::KeyEventState;
    use futebol_core::config::Config;
    use futebol_core::store::ViewStore;

    use crate::clipboard::MemoryClipboard;
    use crate::worker::WorkerCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn app() -> (AppState, mpsc::Receiver<WorkerCommand>) {
        let (tx, rx) = mpsc::channel();
        let (_resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(
            Config::default(),
            ViewStore::in_memory(),
            "mock",
            tx,
            resp_rx,
            Box::new(MemoryClipboard::default()),
        );
        (app, rx)
    }

    #[test]
    fn number_keys_select_panels() {
        let (mut app, _rx) = app();
        handle_key(&mut app, press(KeyCode::Char('5')));
        assert_eq!(app.active_panel, Panel::Predictions);
        handle_key(&mut app, press(KeyCode::Char('1')));
        assert_eq!(app.active_panel, Panel::Dashboard);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::About);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _rx) = app();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(app.running);
    }

    #[test]
    fn welcome_swallows_first_key() {
        let (mut app, _rx) = app();
        app.overlay = Overlay::Welcome;
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn pending_train_ignores_repeat() {
        let (mut app, rx) = app();
        app.active_panel = Panel::Training;
        handle_key(&mut app, press(KeyCode::Enter));
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert!(app.is_pending(Action::Train));
    }

    #[test]
    fn reset_requires_confirmation() {
        let (mut app, _rx) = app();
        handle_key(&mut app, press(KeyCode::Char('X')));
        assert_eq!(app.overlay, Overlay::ConfirmReset);
        handle_key(&mut app, press(KeyCode::Char('n')));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn splits_locked_while_backtest_runs() {
        let (mut app, _rx) = app();
        app.active_panel = Panel::Backtest;
        handle_key(&mut app, press(KeyCode::Char('+')));
        assert_eq!(app.backtest.splits, 6);
        handle_key(&mut app, press(KeyCode::Enter));
        handle_key(&mut app, press(KeyCode::Char('+')));
        assert_eq!(app.backtest.splits, 6);
    }

    #[test]
    fn paste_on_data_panel_starts_a_check() {
        let (mut app, rx) = app();
        app.active_panel = Panel::Data;
        handle_paste(&mut app, "'/tmp/jogos.csv'");
        assert!(app.is_pending(Action::ValidateData));
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::Run { .. })));
    }
}
