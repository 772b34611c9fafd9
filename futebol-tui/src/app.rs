//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels;
//! completions come back through [`AppState::apply_response`].

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use futebol_core::api::{
    BacktestRequest, EvaluateRequest, FetchRequest, HealthStatus, MatchRecord, PredictRequest,
    PredictionRow, TrainRequest, DEFAULT_FIXTURES_PATH, DEFAULT_SPLITS, MAX_SPLITS, MIN_SPLITS,
};
use futebol_core::config::Config;
use futebol_core::export;
use futebol_core::intake::{CsvValidation, FIXTURE_COLUMNS, MATCH_COLUMNS};
use futebol_core::store::{StoreError, ViewStore};
use futebol_core::table::{filter_rows, Clipboard, Column, TableRow, TableState};

use crate::columns::{self, TEAM_SEARCH_KEYS};
use crate::tickets::{Action, Requests};
use crate::worker::{Failure, Job, Outcome, WorkerCommand, WorkerResponse};

pub const ERROR_HISTORY_CAP: usize = 50;

/// What the status bar says when any operation fails. Details go to the
/// error history.
pub const GENERIC_ERROR: &str = "An error occurred. Try again.";

pub const DEFAULT_LEAGUE: &str = "PL";
pub const DEFAULT_SEASON: u16 = 2024;
pub const DEFAULT_LIMIT: u32 = 3000;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Dashboard,
    Data,
    Training,
    Backtest,
    Predictions,
    About,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Dashboard,
        Panel::Data,
        Panel::Training,
        Panel::Backtest,
        Panel::Predictions,
        Panel::About,
    ];

    pub fn index(self) -> usize {
        match self {
            Panel::Dashboard => 0,
            Panel::Data => 1,
            Panel::Training => 2,
            Panel::Backtest => 3,
            Panel::Predictions => 4,
            Panel::About => 5,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::Data => "Data",
            Panel::Training => "Training",
            Panel::Backtest => "Backtest",
            Panel::Predictions => "Predictions",
            Panel::About => "About",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Backend,
    Data,
    Storage,
    Export,
    Clipboard,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Backend => "API",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Storage => "STORE",
            ErrorCategory::Export => "EXPORT",
            ErrorCategory::Clipboard => "CLIP",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// Last known backend reachability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthState {
    Unknown,
    Up { time: String },
    Down(String),
}

/// Text inputs reachable through the edit prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    League,
    Season,
    Limit,
    Token,
    DataPath,
    Cutoff,
    FixturesPath,
    TeamSearch,
    PreviewSearch,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::League => "League",
            Field::Season => "Season",
            Field::Limit => "Limit",
            Field::Token => "API token",
            Field::DataPath => "CSV file",
            Field::Cutoff => "Cutoff (YYYY-MM-DD, empty = all data)",
            Field::FixturesPath => "Fixtures CSV file",
            Field::TeamSearch => "Search team",
            Field::PreviewSearch => "Search preview",
        }
    }

    /// Search fields filter as you type.
    pub fn is_search(self) -> bool {
        matches!(self, Field::TeamSearch | Field::PreviewSearch)
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    Report,
    ConfirmReset,
    Edit {
        field: Field,
        buffer: String,
        original: String,
    },
}

/// Which file picker a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTarget {
    Data,
    Fixtures,
}

impl FileTarget {
    fn action(self) -> Action {
        match self {
            FileTarget::Data => Action::ValidateData,
            FileTarget::Fixtures => Action::ValidateFixtures,
        }
    }

    fn required(self) -> &'static [&'static str] {
        match self {
            FileTarget::Data => MATCH_COLUMNS,
            FileTarget::Fixtures => FIXTURE_COLUMNS,
        }
    }
}

/// A chosen CSV file and how its check went.
#[derive(Debug, Clone, Default)]
pub enum FileSelection {
    #[default]
    Empty,
    Checking(PathBuf),
    Valid(CsvValidation),
    Invalid {
        path: PathBuf,
        message: String,
        validation: Option<CsvValidation>,
    },
}

impl FileSelection {
    /// Path usable for upload or prediction.
    pub fn accepted(&self) -> Option<&Path> {
        match self {
            FileSelection::Valid(v) => v.accepted(),
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            FileSelection::Empty => None,
            FileSelection::Checking(path) | FileSelection::Invalid { path, .. } => Some(path),
            FileSelection::Valid(v) => Some(&v.path),
        }
    }

    pub fn validation(&self) -> Option<&CsvValidation> {
        match self {
            FileSelection::Valid(v) => Some(v),
            FileSelection::Invalid { validation, .. } => validation.as_ref(),
            _ => None,
        }
    }
}

/// Data panel: API fetch form plus CSV selection and preview.
#[derive(Debug)]
pub struct DataPanelState {
    pub league: String,
    pub season: u16,
    pub limit: u32,
    pub token: String,
    pub file: FileSelection,
    /// Preview rows that parsed as match records.
    pub records: Vec<MatchRecord>,
    pub preview: TableState,
}

impl DataPanelState {
    pub fn new(page_size: usize) -> Self {
        Self {
            league: DEFAULT_LEAGUE.to_string(),
            season: DEFAULT_SEASON,
            limit: DEFAULT_LIMIT,
            token: String::new(),
            file: FileSelection::Empty,
            records: Vec::new(),
            preview: TableState::new(page_size),
        }
    }

    /// True when every preview row parsed as a match record.
    pub fn typed_preview(&self) -> bool {
        match self.file.validation() {
            Some(v) => !self.records.is_empty() && self.records.len() == v.preview.len(),
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct TrainingPanelState {
    pub cutoff: Option<NaiveDate>,
    pub use_xgb: bool,
}

#[derive(Debug)]
pub struct BacktestPanelState {
    pub splits: u32,
    pub use_xgb: bool,
    pub table: TableState,
}

impl BacktestPanelState {
    pub fn new(page_size: usize) -> Self {
        Self {
            splits: DEFAULT_SPLITS,
            use_xgb: false,
            table: TableState::new(page_size),
        }
    }

    pub fn increase_splits(&mut self) {
        self.splits = (self.splits + 1).min(MAX_SPLITS);
    }

    pub fn decrease_splits(&mut self) {
        self.splits = self.splits.saturating_sub(1).max(MIN_SPLITS);
    }
}

#[derive(Debug)]
pub struct PredictionsPanelState {
    pub file: FileSelection,
    /// `None` shows every league.
    pub league: Option<String>,
    pub table: TableState,
}

impl PredictionsPanelState {
    pub fn new(page_size: usize) -> Self {
        Self {
            file: FileSelection::Empty,
            league: None,
            table: TableState::new(page_size).with_search_keys(TEAM_SEARCH_KEYS),
        }
    }

    /// Fixtures path sent with the next prediction request.
    /// Fixtures file for a prediction run. The default applies only when
    /// nothing was chosen; a pending or rejected selection yields `None`.
    pub fn fixtures_path(&self) -> Option<String> {
        match &self.file {
            FileSelection::Empty => Some(DEFAULT_FIXTURES_PATH.to_string()),
            selection => selection.accepted().map(|p| p.display().to_string()),
        }
    }
}

/// Navigation and copy commands shared by every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCmd {
    Up,
    Down,
    NextPage,
    PrevPage,
    FocusNext,
    FocusPrev,
    Sort,
    Copy,
}

fn drive<R: TableRow>(
    state: &mut TableState,
    rows: &[R],
    cols: &[Column<R>],
    keep: impl Fn(&R) -> bool,
    cmd: TableCmd,
    clipboard: &mut dyn Clipboard,
) -> Result<(), String> {
    let view = state.view_with(rows, cols, keep);
    match cmd {
        TableCmd::Up => state.cursor_up(),
        TableCmd::Down => state.cursor_down(view.rows.len()),
        TableCmd::NextPage => {
            state.next_page(view.filtered_len);
        }
        TableCmd::PrevPage => {
            state.prev_page();
        }
        TableCmd::FocusNext => state.focus_next_column(cols.len()),
        TableCmd::FocusPrev => state.focus_prev_column(),
        TableCmd::Sort => {
            state.toggle_sort_focused(cols);
        }
        TableCmd::Copy => return state.copy_selected(&view, cols, clipboard, Instant::now()),
    }
    Ok(())
}

fn in_league<'a>(league: Option<&'a str>) -> impl Fn(&PredictionRow) -> bool + 'a {
    move |row: &PredictionRow| league.map_or(true, |l| row.league == l)
}

/// Strip what terminals add around a dropped or pasted path: quotes,
/// `file://`, backslash-escaped spaces.
pub fn normalize_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);
    let bare = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    let path = bare.replace("\\ ", " ");
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Panel states
    pub data: DataPanelState,
    pub training: TrainingPanelState,
    pub backtest: BacktestPanelState,
    pub predictions: PredictionsPanelState,
    pub about_scroll: u16,

    // Results and backend
    pub store: ViewStore,
    pub config: Config,
    pub backend_name: String,
    pub health: HealthState,
    pub requests: Requests,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub clipboard: Box<dyn Clipboard>,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(
        config: Config,
        store: ViewStore,
        backend_name: impl Into<String>,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let page_size = config.ui.page_size;
        Self {
            active_panel: Panel::Dashboard,
            running: true,
            data: DataPanelState::new(page_size),
            training: TrainingPanelState::default(),
            backtest: BacktestPanelState::new(page_size),
            predictions: PredictionsPanelState::new(page_size),
            about_scroll: 0,
            store,
            config,
            backend_name: backend_name.into(),
            health: HealthState::Unknown,
            requests: Requests::default(),
            worker_tx,
            worker_rx,
            clipboard,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        tracing::warn!(category = category.label(), %context, "{message}");
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Record a failed operation and show the generic message.
    fn report_failure(&mut self, action: Action, failure: Failure) {
        self.push_error(failure.category, failure.detail, action.label().to_string());
        self.status_message = Some((GENERIC_ERROR.to_string(), StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn is_pending(&self, action: Action) -> bool {
        self.requests.is_pending(action)
    }

    // ── Dispatch ────────────────────────────────────────────────────

    /// Hand a job to the worker unless the same action is still in flight.
    fn dispatch(&mut self, action: Action, job: Job) -> bool {
        let Some(ticket) = self.requests.begin(action) else {
            self.set_warning(format!("{} already in progress", action.label()));
            return false;
        };
        tracing::info!(?action, generation = ticket.generation, "dispatching");
        if self.worker_tx.send(WorkerCommand::Run { ticket, job }).is_err() {
            self.requests.finish(ticket);
            self.push_error(
                ErrorCategory::Other,
                "background worker is not running".into(),
                action.label().to_string(),
            );
            return false;
        }
        true
    }

    pub fn check_health(&mut self) {
        self.dispatch(Action::Health, Job::Health);
    }

    pub fn start_fetch(&mut self) {
        let req = FetchRequest::api(
            self.data.league.clone(),
            self.data.season,
            self.data.limit,
            Some(self.data.token.clone()),
        );
        if self.dispatch(Action::Fetch, Job::Fetch(req)) {
            self.set_status(format!(
                "Fetching {} {} (limit {})...",
                self.data.league, self.data.season, self.data.limit
            ));
        }
    }

    pub fn start_upload(&mut self) {
        let Some(path) = self.data.file.accepted().map(Path::to_path_buf) else {
            self.set_warning("Select a valid CSV file first");
            return;
        };
        if self.dispatch(Action::Upload, Job::UploadAndFetch { path }) {
            self.set_status("Uploading CSV...");
        }
    }

    pub fn start_train(&mut self) {
        let req = TrainRequest {
            cutoff: self.training.cutoff,
            use_xgb: self.training.use_xgb,
        };
        if self.dispatch(Action::Train, Job::Train(req)) {
            self.set_status("Training model...");
        }
    }

    pub fn start_evaluate(&mut self) {
        let req = EvaluateRequest {
            cutoff: self.training.cutoff,
        };
        if self.dispatch(Action::Evaluate, Job::Evaluate(req)) {
            self.set_status("Evaluating model...");
        }
    }

    pub fn start_backtest(&mut self) {
        let req = BacktestRequest::new(self.backtest.splits, self.backtest.use_xgb);
        if self.dispatch(Action::Backtest, Job::Backtest(req)) {
            self.set_status(format!("Running backtest with {} splits...", req.splits));
        }
    }

    pub fn start_predict(&mut self) {
        let Some(fixtures_csv_path) = self.predictions.fixtures_path() else {
            self.set_warning("Select a valid fixtures CSV or clear the selection");
            return;
        };
        let req = PredictRequest { fixtures_csv_path };
        if self.dispatch(Action::Predict, Job::Predict(req)) {
            self.set_status("Generating predictions...");
        }
    }

    /// Check a candidate file on the worker; the newest selection wins.
    pub fn select_file(&mut self, target: FileTarget, path: PathBuf) {
        let options = self.config.intake_options(target.required());
        let job = Job::ValidateCsv {
            path: path.clone(),
            options,
        };
        if self.dispatch(target.action(), job) {
            *self.selection_mut(target) = FileSelection::Checking(path);
            if target == FileTarget::Data {
                self.data.records.clear();
                self.data.preview.reset_position();
            }
        }
    }

    pub fn clear_file(&mut self, target: FileTarget) {
        *self.selection_mut(target) = FileSelection::Empty;
        if target == FileTarget::Data {
            self.data.records.clear();
            self.data.preview.reset_position();
        }
    }

    fn selection_mut(&mut self, target: FileTarget) -> &mut FileSelection {
        match target {
            FileTarget::Data => &mut self.data.file,
            FileTarget::Fixtures => &mut self.predictions.file,
        }
    }

    // ── Completions ─────────────────────────────────────────────────

    /// Apply a worker completion, unless a newer request superseded it.
    pub fn apply_response(&mut self, resp: WorkerResponse) {
        let WorkerResponse { ticket, outcome } = resp;
        if !self.requests.finish(ticket) {
            return;
        }
        match outcome {
            Ok(outcome) => self.apply_outcome(ticket.action, outcome),
            Err(failure) => {
                if ticket.action == Action::Health {
                    self.health = HealthState::Down(failure.detail.clone());
                }
                self.report_failure(ticket.action, failure);
            }
        }
    }

    fn apply_outcome(&mut self, action: Action, outcome: Outcome) {
        match outcome {
            Outcome::Health(h) => {
                self.health = match h.status {
                    HealthStatus::Ok => HealthState::Up { time: h.time },
                    HealthStatus::Error => HealthState::Down("backend reports an error".into()),
                };
            }
            Outcome::Fetched(info) => {
                self.set_status(format!("Data loaded: {} rows", info.rows));
                self.persist(|s| s.set_data_info(Some(info)));
            }
            Outcome::Trained(t) => {
                self.set_status(format!(
                    "Training complete: accuracy {:.1}%",
                    t.metrics.accuracy * 100.0
                ));
                self.persist(|s| s.record_training(t));
            }
            Outcome::Evaluated(e) => {
                self.set_status(format!(
                    "Evaluation complete: accuracy {:.1}% (r for report)",
                    e.metrics.accuracy * 100.0
                ));
                self.persist(|s| s.set_last_evaluation(Some(e)));
            }
            Outcome::Backtested(folds) => {
                self.set_status(format!("Backtest complete: {} folds", folds.len()));
                self.backtest.table.reset_position();
                self.persist(|s| s.set_last_backtest(Some(folds)));
            }
            Outcome::Predicted(rows) => {
                self.set_status(format!("{} predictions generated", rows.len()));
                self.predictions.table.reset_position();
                let stale_league = self
                    .predictions
                    .league
                    .as_ref()
                    .is_some_and(|l| !rows.iter().any(|r| &r.league == l));
                if stale_league {
                    self.predictions.league = None;
                }
                self.persist(|s| s.set_predictions(rows));
            }
            Outcome::Checked { path, result } => {
                let target = match action {
                    Action::ValidateFixtures => FileTarget::Fixtures,
                    _ => FileTarget::Data,
                };
                self.apply_check(target, path, result);
            }
        }
    }

    fn apply_check(
        &mut self,
        target: FileTarget,
        path: PathBuf,
        result: Result<CsvValidation, String>,
    ) {
        let selection = match result {
            Ok(v) if v.valid => {
                self.set_status(format!("{}: {} rows, ready", v.file_name(), v.row_count));
                if target == FileTarget::Data {
                    self.data.records = v.match_records();
                }
                FileSelection::Valid(v)
            }
            Ok(v) => {
                let message = v.errors.join(" ");
                self.set_warning(message.clone());
                FileSelection::Invalid {
                    path,
                    message,
                    validation: Some(v),
                }
            }
            Err(message) => {
                self.set_warning(message.clone());
                FileSelection::Invalid {
                    path,
                    message,
                    validation: None,
                }
            }
        };
        *self.selection_mut(target) = selection;
    }

    fn persist(&mut self, write: impl FnOnce(&mut ViewStore) -> Result<(), StoreError>) {
        if let Err(e) = write(&mut self.store) {
            self.push_error(ErrorCategory::Storage, e.to_string(), "saving view state".into());
        }
    }

    /// Clear every stored result. In-flight requests are forgotten so
    /// their late completions cannot repopulate the store.
    pub fn reset_all(&mut self) {
        self.requests.invalidate_all();
        // Dropped checks never complete.
        for target in [FileTarget::Data, FileTarget::Fixtures] {
            if matches!(self.selection_mut(target), FileSelection::Checking(_)) {
                self.clear_file(target);
            }
        }
        self.backtest.table.reset_position();
        self.predictions.table.set_query("");
        self.predictions.league = None;
        match self.store.clear_all() {
            Ok(()) => self.set_status("All saved results cleared"),
            Err(e) => {
                self.push_error(ErrorCategory::Storage, e.to_string(), "reset".into());
            }
        }
    }

    // ── Predictions ─────────────────────────────────────────────────

    /// Distinct leagues among the stored predictions, sorted.
    pub fn leagues(&self) -> Vec<String> {
        self.store
            .predictions()
            .iter()
            .map(|r| r.league.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All leagues, then each league in order, then back to all.
    pub fn cycle_league(&mut self) {
        let leagues = self.leagues();
        let next = match &self.predictions.league {
            None => leagues.first().cloned(),
            Some(current) => leagues
                .iter()
                .position(|l| l == current)
                .and_then(|i| leagues.get(i + 1))
                .cloned(),
        };
        self.predictions.league = next;
        self.predictions.table.reset_position();
    }

    /// Predictions passing the league and team filters, in stored order.
    pub fn filtered_predictions(&self) -> Vec<&PredictionRow> {
        let keep = in_league(self.predictions.league.as_deref());
        filter_rows(
            self.store.predictions(),
            &TEAM_SEARCH_KEYS,
            self.predictions.table.query(),
        )
        .into_iter()
        .filter(|row| keep(*row))
        .collect()
    }

    pub fn can_export_predictions(&self) -> bool {
        !self.filtered_predictions().is_empty()
    }

    pub fn can_export_backtest(&self) -> bool {
        self.store.last_backtest().is_some_and(|f| !f.is_empty())
    }

    // ── Export ──────────────────────────────────────────────────────

    pub fn export_backtest(&mut self) {
        let Some(folds) = self.store.last_backtest().filter(|f| !f.is_empty()) else {
            self.set_warning("No backtest results to export");
            return;
        };
        let result = export::export_backtest(&self.config.ui.export_dir, folds);
        self.finish_export(result);
    }

    pub fn export_predictions(&mut self) {
        let rows = self.filtered_predictions();
        if rows.is_empty() {
            self.set_warning("No predictions to export");
            return;
        }
        let result = export::export_predictions(&self.config.ui.export_dir, &rows);
        self.finish_export(result);
    }

    fn finish_export(&mut self, result: Result<PathBuf, export::ExportError>) {
        match result {
            Ok(path) => self.set_status(format!("Exported {}", path.display())),
            Err(e) => self.push_error(ErrorCategory::Export, e.to_string(), "export".into()),
        }
    }

    // ── Tables ──────────────────────────────────────────────────────

    /// Run a table command against the active panel's table.
    pub fn table_command(&mut self, cmd: TableCmd) {
        let clipboard = self.clipboard.as_mut();
        let result = match self.active_panel {
            Panel::Data => {
                let typed = self.data.typed_preview();
                let Some(v) = self.data.file.validation() else {
                    return;
                };
                if typed {
                    let cols = columns::matches();
                    let rows = &self.data.records;
                    drive(&mut self.data.preview, rows, &cols, |_| true, cmd, clipboard)
                } else {
                    let cols = columns::preview(&v.headers);
                    drive(&mut self.data.preview, &v.preview, &cols, |_| true, cmd, clipboard)
                }
            }
            Panel::Backtest => {
                let rows = self.store.last_backtest().unwrap_or(&[]);
                let cols = columns::backtest();
                drive(&mut self.backtest.table, rows, &cols, |_| true, cmd, clipboard)
            }
            Panel::Predictions => {
                let keep = in_league(self.predictions.league.as_deref());
                let rows = self.store.predictions();
                let cols = columns::predictions();
                drive(&mut self.predictions.table, rows, &cols, keep, cmd, clipboard)
            }
            Panel::Dashboard | Panel::Training | Panel::About => return,
        };
        match result {
            Ok(()) if cmd == TableCmd::Copy => self.set_status("Row copied to clipboard"),
            Ok(()) => {}
            Err(e) => self.push_error(ErrorCategory::Clipboard, e, "copy row".into()),
        }
    }

    // ── Edit prompt ─────────────────────────────────────────────────

    pub fn begin_edit(&mut self, field: Field) {
        let current = match field {
            Field::League => self.data.league.clone(),
            Field::Season => self.data.season.to_string(),
            Field::Limit => self.data.limit.to_string(),
            Field::Token => self.data.token.clone(),
            Field::DataPath => path_text(self.data.file.path()),
            Field::Cutoff => self
                .training
                .cutoff
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Field::FixturesPath => path_text(self.predictions.file.path()),
            Field::TeamSearch => self.predictions.table.query().to_string(),
            Field::PreviewSearch => self.data.preview.query().to_string(),
        };
        self.overlay = Overlay::Edit {
            field,
            buffer: current.clone(),
            original: current,
        };
    }

    pub fn edit_push(&mut self, c: char) {
        if let Overlay::Edit { buffer, .. } = &mut self.overlay {
            buffer.push(c);
        }
        self.sync_search();
    }

    pub fn edit_push_str(&mut self, s: &str) {
        if let Overlay::Edit { buffer, .. } = &mut self.overlay {
            buffer.push_str(s.trim_end_matches(['\r', '\n']));
        }
        self.sync_search();
    }

    pub fn edit_backspace(&mut self) {
        if let Overlay::Edit { buffer, .. } = &mut self.overlay {
            buffer.pop();
        }
        self.sync_search();
    }

    fn sync_search(&mut self) {
        if let Overlay::Edit { field, buffer, .. } = &self.overlay {
            let (field, query) = (*field, buffer.clone());
            self.set_search(field, query);
        }
    }

    fn set_search(&mut self, field: Field, query: String) {
        match field {
            Field::TeamSearch => self.predictions.table.set_query(query),
            Field::PreviewSearch => self.data.preview.set_query(query),
            _ => {}
        }
    }

    /// Close the prompt without applying; search fields get their old query back.
    pub fn cancel_edit(&mut self) {
        if let Overlay::Edit {
            field, original, ..
        } = std::mem::replace(&mut self.overlay, Overlay::None)
        {
            self.set_search(field, original);
        }
    }

    pub fn commit_edit(&mut self) {
        let Overlay::Edit { field, buffer, .. } =
            std::mem::replace(&mut self.overlay, Overlay::None)
        else {
            return;
        };
        let value = buffer.trim();
        match field {
            Field::League => {
                if value.is_empty() {
                    self.set_warning("League cannot be empty");
                } else {
                    self.data.league = value.to_string();
                }
            }
            Field::Season => match value.parse::<u16>() {
                Ok(year) if (1900..=2100).contains(&year) => self.data.season = year,
                _ => self.set_warning("Season must be a year such as 2024"),
            },
            Field::Limit => match value.parse::<u32>() {
                Ok(n) if n > 0 => self.data.limit = n,
                _ => self.set_warning("Limit must be a positive number"),
            },
            Field::Token => self.data.token = value.to_string(),
            Field::Cutoff => {
                if value.is_empty() {
                    self.training.cutoff = None;
                } else {
                    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                        Ok(date) => self.training.cutoff = Some(date),
                        Err(_) => self.set_warning("Cutoff must be YYYY-MM-DD"),
                    }
                }
            }
            Field::DataPath => self.choose_path(FileTarget::Data, value),
            Field::FixturesPath => self.choose_path(FileTarget::Fixtures, value),
            Field::TeamSearch | Field::PreviewSearch => {}
        }
    }

    fn choose_path(&mut self, target: FileTarget, raw: &str) {
        match normalize_path(raw) {
            Some(path) => self.select_file(target, path),
            None => self.clear_file(target),
        }
    }
}

fn path_text(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::clipboard::MemoryClipboard;
    use crate::tickets::Ticket;

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
    fn panel_cycle() {
        assert_eq!(Panel::Dashboard.next(), Panel::Data);
        assert_eq!(Panel::About.next(), Panel::Dashboard);
        assert_eq!(Panel::Dashboard.prev(), Panel::About);
        assert_eq!(Panel::Data.prev(), Panel::Dashboard);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..6 {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(6).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _rx) = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn splits_stay_in_range() {
        let mut bt = BacktestPanelState::new(10);
        for _ in 0..20 {
            bt.increase_splits();
        }
        assert_eq!(bt.splits, MAX_SPLITS);
        for _ in 0..20 {
            bt.decrease_splits();
        }
        assert_eq!(bt.splits, MIN_SPLITS);
    }

    #[test]
    fn cutoff_prompt_parses_or_clears() {
        let (mut app, _rx) = app();
        app.begin_edit(Field::Cutoff);
        app.edit_push_str("2024-06-30");
        app.commit_edit();
        assert_eq!(app.training.cutoff, NaiveDate::from_ymd_opt(2024, 6, 30));

        app.begin_edit(Field::Cutoff);
        app.edit_push_str("30/06/2024");
        app.commit_edit();
        assert_eq!(app.training.cutoff, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(
            app.status_message.as_ref().map(|(_, l)| *l),
            Some(StatusLevel::Warning)
        );

        app.begin_edit(Field::Cutoff);
        for _ in 0..10 {
            app.edit_backspace();
        }
        app.commit_edit();
        assert_eq!(app.training.cutoff, None);
    }

    #[test]
    fn cancelled_search_restores_query() {
        let (mut app, _rx) = app();
        app.predictions.table.set_query("ben");
        app.begin_edit(Field::TeamSearch);
        app.edit_push('x');
        assert_eq!(app.predictions.table.query(), "benx");
        app.cancel_edit();
        assert_eq!(app.predictions.table.query(), "ben");
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn paths_lose_terminal_decoration() {
        assert_eq!(
            normalize_path("'/tmp/my file.csv'\n"),
            Some(PathBuf::from("/tmp/my file.csv"))
        );
        assert_eq!(
            normalize_path("file:///tmp/a.csv"),
            Some(PathBuf::from("/tmp/a.csv"))
        );
        assert_eq!(
            normalize_path("/tmp/my\\ file.csv"),
            Some(PathBuf::from("/tmp/my file.csv"))
        );
        assert_eq!(normalize_path("   "), None);
    }

    #[test]
    fn upload_needs_a_valid_file() {
        let (mut app, rx) = app();
        app.start_upload();
        assert!(rx.try_recv().is_err());
        assert!(!app.is_pending(Action::Upload));
    }

    #[test]
    fn predict_defaults_fixtures_path() {
        let (mut app, rx) = app();
        app.start_predict();
        match rx.try_recv().unwrap() {
            WorkerCommand::Run {
                job: Job::Predict(req),
                ..
            } => assert_eq!(req.fixtures_csv_path, DEFAULT_FIXTURES_PATH),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn sent_ticket(rx: &mpsc::Receiver<WorkerCommand>) -> Ticket {
        match rx.try_recv().unwrap() {
            WorkerCommand::Run { ticket, .. } => ticket,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn reset_releases_pending_file_checks() {
        let (mut app, rx) = app();
        app.select_file(FileTarget::Data, PathBuf::from("/tmp/x.csv"));
        let data_ticket = sent_ticket(&rx);
        app.select_file(FileTarget::Fixtures, PathBuf::from("/tmp/f.csv"));
        let fixtures_ticket = sent_ticket(&rx);
        assert!(matches!(app.data.file, FileSelection::Checking(_)));

        app.reset_all();
        for ticket in [data_ticket, fixtures_ticket] {
            app.apply_response(WorkerResponse {
                ticket,
                outcome: Ok(Outcome::Checked {
                    path: PathBuf::from("/tmp/x.csv"),
                    result: Err("late".into()),
                }),
            });
        }

        assert!(matches!(app.data.file, FileSelection::Empty));
        assert!(matches!(app.predictions.file, FileSelection::Empty));
        assert!(!app.is_pending(Action::ValidateData));

        app.select_file(FileTarget::Data, PathBuf::from("/tmp/y.csv"));
        assert!(app.is_pending(Action::ValidateData));
    }

    #[test]
    fn rejected_fixtures_block_prediction() {
        let (mut app, rx) = app();
        app.predictions.file = FileSelection::Invalid {
            path: PathBuf::from("/tmp/fixtures.txt"),
            message: "Please select a .csv file".into(),
            validation: None,
        };
        app.start_predict();
        assert!(rx.try_recv().is_err());
        assert!(!app.is_pending(Action::Predict));
        assert_eq!(
            app.status_message.as_ref().map(|(_, l)| *l),
            Some(StatusLevel::Warning)
        );

        app.predictions.file = FileSelection::Checking(PathBuf::from("/tmp/f.csv"));
        assert_eq!(app.predictions.fixtures_path(), None);

        app.clear_file(FileTarget::Fixtures);
        assert_eq!(
            app.predictions.fixtures_path().as_deref(),
            Some(DEFAULT_FIXTURES_PATH)
        );
    }
}
