//! View-state store: the latest result of each backend operation.
//!
//! One JSON file holds everything. Each setter replaces its slot wholesale
//! and rewrites the file; nothing is merged or versioned beyond the
//! envelope's format number.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{BacktestFold, EvaluateResponse, FetchResponse, PredictionRow, TrainResponse};

pub const STORE_NAME: &str = "futebol-1x2-storage";
pub const STORE_FILE: &str = "futebol-1x2-storage.json";

/// Training runs kept for the dashboard's metrics chart.
pub const METRICS_HISTORY_CAP: usize = 20;

const FORMAT_VERSION: u32 = 0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot write state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything the dashboard remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub last_training: Option<TrainResponse>,
    pub last_evaluation: Option<EvaluateResponse>,
    pub last_backtest: Option<Vec<BacktestFold>>,
    pub predictions: Vec<PredictionRow>,
    pub data_info: Option<FetchResponse>,
    /// Past training runs, oldest first.
    pub metrics_history: Vec<TrainResponse>,
}

impl ViewState {
    pub fn is_empty(&self) -> bool {
        *self == ViewState::default()
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    state: ViewState,
}

/// Owner of [`ViewState`], optionally backed by a file.
#[derive(Debug, Clone)]
pub struct ViewStore {
    path: Option<PathBuf>,
    state: ViewState,
}

impl ViewStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: ViewState::default(),
        }
    }

    /// Load from `path`. Missing or unreadable files yield an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load(&path);
        Self {
            path: Some(path),
            state,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn last_training(&self) -> Option<&TrainResponse> {
        self.state.last_training.as_ref()
    }

    pub fn last_evaluation(&self) -> Option<&EvaluateResponse> {
        self.state.last_evaluation.as_ref()
    }

    pub fn last_backtest(&self) -> Option<&[BacktestFold]> {
        self.state.last_backtest.as_deref()
    }

    pub fn predictions(&self) -> &[PredictionRow] {
        &self.state.predictions
    }

    pub fn data_info(&self) -> Option<&FetchResponse> {
        self.state.data_info.as_ref()
    }

    pub fn metrics_history(&self) -> &[TrainResponse] {
        &self.state.metrics_history
    }

    pub fn set_last_training(&mut self, value: Option<TrainResponse>) -> Result<(), StoreError> {
        self.state.last_training = value;
        self.save()
    }

    /// Store a finished training run as the latest one and append it to the
    /// history, dropping the oldest entries past [`METRICS_HISTORY_CAP`].
    pub fn record_training(&mut self, value: TrainResponse) -> Result<(), StoreError> {
        let history = &mut self.state.metrics_history;
        history.push(value.clone());
        let excess = history.len().saturating_sub(METRICS_HISTORY_CAP);
        history.drain(..excess);
        self.state.last_training = Some(value);
        self.save()
    }

    pub fn set_last_evaluation(
        &mut self,
        value: Option<EvaluateResponse>,
    ) -> Result<(), StoreError> {
        self.state.last_evaluation = value;
        self.save()
    }

    pub fn set_last_backtest(&mut self, value: Option<Vec<BacktestFold>>) -> Result<(), StoreError> {
        self.state.last_backtest = value;
        self.save()
    }

    pub fn set_predictions(&mut self, value: Vec<PredictionRow>) -> Result<(), StoreError> {
        self.state.predictions = value;
        self.save()
    }

    pub fn set_data_info(&mut self, value: Option<FetchResponse>) -> Result<(), StoreError> {
        self.state.data_info = value;
        self.save()
    }

    /// Reset every slot, history included.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.state = ViewState::default();
        self.save()
    }

    /// Write the current state. No-op for in-memory stores.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        save(path, &self.state)
    }
}

fn load(path: &Path) -> ViewState {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return ViewState::default(),
    };
    match serde_json::from_str::<Envelope>(&content) {
        Ok(env) => env.state,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
            ViewState::default()
        }
    }
}

fn save(path: &Path, state: &ViewState) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let env = Envelope {
        version: FORMAT_VERSION,
        state: state.clone(),
    };
    let json = serde_json::to_string_pretty(&env)?;
    std::fs::write(path, json).map_err(io_err)?;
    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

/// Default location: `<config dir>/futebol-1x2/futebol-1x2-storage.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("futebol-1x2").join(STORE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Metrics;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn training() -> TrainResponse {
        TrainResponse {
            metrics: Metrics {
                accuracy: 0.6,
                log_loss: 1.0,
                brier_score: 0.25,
            },
            cutoff: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            trained_at: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ViewStore::open(dir.path().join("nope.json"));
        assert!(store.state().is_empty());
    }

    #[test]
    fn setters_persist_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join(STORE_FILE);
        let mut store = ViewStore::open(&path);
        store.set_last_training(Some(training())).unwrap();

        let reopened = ViewStore::open(&path);
        assert_eq!(reopened.last_training(), Some(&training()));
    }

    #[test]
    fn file_uses_camel_case_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let mut store = ViewStore::open(&path);
        store.set_last_training(Some(training())).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 0);
        assert!(raw["state"]["lastTraining"].is_object());
        assert!(raw["state"]["predictions"].is_array());
        assert!(raw["state"]["dataInfo"].is_null());
    }

    #[test]
    fn clear_all_resets_every_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let mut store = ViewStore::open(&path);
        store.set_last_training(Some(training())).unwrap();
        store.set_last_backtest(Some(Vec::new())).unwrap();
        store.clear_all().unwrap();
        assert!(store.state().is_empty());
        assert!(ViewStore::open(&path).state().is_empty());
    }

    #[test]
    fn training_history_is_bounded_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let mut store = ViewStore::open(&path);
        for i in 0..(METRICS_HISTORY_CAP + 3) {
            let mut run = training();
            run.metrics.accuracy = i as f64 / 100.0;
            store.record_training(run).unwrap();
        }

        let reopened = ViewStore::open(&path);
        let history = reopened.metrics_history();
        assert_eq!(history.len(), METRICS_HISTORY_CAP);
        assert_eq!(history[0].metrics.accuracy, 0.03);
        assert_eq!(
            reopened.last_training().map(|t| t.metrics.accuracy),
            Some((METRICS_HISTORY_CAP + 2) as f64 / 100.0)
        );

        store.clear_all().unwrap();
        assert!(store.metrics_history().is_empty());
    }

    #[test]
    fn files_without_history_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(&path, r#"{"version":0,"state":{"predictions":[]}}"#).unwrap();
        let store = ViewStore::open(&path);
        assert!(store.metrics_history().is_empty());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ViewStore::open(&path).state().is_empty());
    }

    #[test]
    fn in_memory_store_never_writes() {
        let mut store = ViewStore::in_memory();
        store.set_predictions(Vec::new()).unwrap();
        assert!(store.path().is_none());
    }
}
