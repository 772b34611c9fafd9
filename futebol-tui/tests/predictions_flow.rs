use std::sync::{mpsc, Arc};
use std::time::Duration;

use ratatui::backend::TestBackend;
use ratatui::Terminal;

use futebol_core::config::Config;
use futebol_core::export::PREDICTIONS_FILE;
use futebol_core::store::ViewStore;
use futebol_core::table::EMPTY_PLACEHOLDER;
use futebol_core::transport::MockBackend;

use futebol_tui::app::{AppState, Panel, StatusLevel};
use futebol_tui::clipboard::MemoryClipboard;
use futebol_tui::tickets::Action;
use futebol_tui::ui::{self, predictions_panel::NO_PREDICTIONS};
use futebol_tui::worker::{self, WorkerCommand};

struct Harness {
    app: AppState,
    worker: Option<std::thread::JoinHandle<()>>,
    _exports: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        let exports = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ui.export_dir = exports.path().to_path_buf();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let worker =
            worker::spawn_worker(Arc::new(MockBackend::instant(7)), cmd_rx, resp_tx).unwrap();
        let app = AppState::new(
            config,
            ViewStore::in_memory(),
            "mock",
            cmd_tx,
            resp_rx,
            Box::new(MemoryClipboard::default()),
        );
        Self {
            app,
            worker: Some(worker),
            _exports: exports,
        }
    }

    /// Wait for one completion and apply it.
    fn settle(&mut self) {
        let resp = self
            .app
            .worker_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker did not answer");
        self.app.apply_response(resp);
    }

    fn screen(&self) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui::draw(f, &self.app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = self.app.worker_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[test]
fn empty_store_shows_placeholder_and_blocks_export() {
    let mut h = Harness::new();
    h.app.active_panel = Panel::Predictions;

    assert!(h.screen().contains(NO_PREDICTIONS));
    assert!(!h.app.can_export_predictions());

    h.app.export_predictions();
    assert_eq!(
        h.app.status_message.as_ref().map(|(_, level)| *level),
        Some(StatusLevel::Warning)
    );
}

#[test]
fn generated_predictions_render_and_export() {
    let mut h = Harness::new();
    h.app.active_panel = Panel::Predictions;

    h.app.start_predict();
    assert!(h.app.is_pending(Action::Predict));
    h.settle();
    assert!(!h.app.is_pending(Action::Predict));

    let rows = h.app.store.predictions().len();
    assert_eq!(rows, 10);

    let screen = h.screen();
    assert!(!screen.contains(NO_PREDICTIONS));
    assert!(screen.contains("Arsenal"));
    assert!(screen.contains("1-10 of 10"));

    h.app.export_predictions();
    let written =
        std::fs::read_to_string(h.app.config.ui.export_dir.join(PREDICTIONS_FILE)).unwrap();
    assert_eq!(written.lines().count(), rows + 1);
}

#[test]
fn filters_narrow_table_and_export() {
    let mut h = Harness::new();
    h.app.active_panel = Panel::Predictions;
    h.app.start_predict();
    h.settle();

    h.app.predictions.table.set_query("benfica");
    assert_eq!(h.app.filtered_predictions().len(), 1);
    h.app.export_predictions();
    let written =
        std::fs::read_to_string(h.app.config.ui.export_dir.join(PREDICTIONS_FILE)).unwrap();
    assert_eq!(written.lines().count(), 2);

    h.app.predictions.table.set_query("zzz");
    assert!(h.screen().contains(EMPTY_PLACEHOLDER));
    assert!(!h.app.can_export_predictions());
}

#[test]
fn league_cycle_walks_every_league_then_all() {
    let mut h = Harness::new();
    h.app.start_predict();
    h.settle();

    let leagues = h.app.leagues();
    assert_eq!(leagues.len(), 7);
    for league in &leagues {
        h.app.cycle_league();
        assert_eq!(h.app.predictions.league.as_ref(), Some(league));
        assert!(h
            .app
            .filtered_predictions()
            .iter()
            .all(|r| &r.league == league));
    }
    h.app.cycle_league();
    assert_eq!(h.app.predictions.league, None);
}

#[test]
fn completion_after_reset_is_dropped() {
    let mut h = Harness::new();
    h.app.start_train();
    h.app.reset_all();
    h.settle();

    assert!(h.app.store.last_training().is_none());
    assert!(!h.app.is_pending(Action::Train));
}

#[test]
fn training_then_evaluation_fill_the_store() {
    let mut h = Harness::new();
    h.app.active_panel = Panel::Training;
    h.app.start_train();
    h.settle();
    h.app.start_evaluate();
    h.settle();

    assert!(h.app.store.last_training().is_some());
    let eval = h.app.store.last_evaluation().unwrap();
    assert_eq!(eval.confusion_matrix.len(), 3);
    assert!(h.screen().contains("Evaluation"));
}

#[test]
fn dashboard_charts_each_training_run() {
    let mut h = Harness::new();
    assert!(h.screen().contains("No training runs yet."));

    for _ in 0..2 {
        h.app.start_train();
        h.settle();
    }
    assert_eq!(h.app.store.metrics_history().len(), 2);

    let screen = h.screen();
    assert!(screen.contains("Metrics history"));
    assert!(!screen.contains("No training runs yet."));
}
