//! Backend transport: one trait, a live HTTP client and a local mock.
//!
//! Both implementations return the same typed responses, so the UI and
//! CLI never know which one they are talking to.

pub mod http;
pub mod mock;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::api::{
    BacktestFold, BacktestRequest, EvaluateRequest, EvaluateResponse, FetchRequest, FetchResponse,
    HealthResponse, Metrics, PredictRequest, PredictionRow, TrainRequest, TrainResponse,
};
use crate::config::{BackendMode, Config};

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Per-operation paths, relative to the base URL.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const FETCH: &str = "/fetch";
    pub const TRAIN: &str = "/train";
    pub const EVALUATE: &str = "/evaluate";
    pub const BACKTEST: &str = "/backtest";
    pub const PREDICT: &str = "/predict";
    pub const UPLOAD_CSV: &str = "/upload_csv";
}

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `body` is the response text as received.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response rejected: {0}")]
    Invalid(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Operations offered by the prediction backend.
pub trait Backend: Send + Sync {
    /// Short label for logs and the status bar.
    fn name(&self) -> &str;

    fn health(&self) -> Result<HealthResponse, ApiError>;

    fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse, ApiError>;

    fn train(&self, req: &TrainRequest) -> Result<TrainResponse, ApiError>;

    fn evaluate(&self, req: &EvaluateRequest) -> Result<EvaluateResponse, ApiError>;

    fn backtest(&self, req: &BacktestRequest) -> Result<Vec<BacktestFold>, ApiError>;

    fn predict(&self, req: &PredictRequest) -> Result<Vec<PredictionRow>, ApiError>;

    /// Send a CSV file as multipart form data. The reply shape is backend-defined.
    fn upload_csv(&self, path: &Path) -> Result<serde_json::Value, ApiError>;
}

/// Build the backend selected by `config`.
pub fn from_config(config: &Config) -> Result<Arc<dyn Backend>, ApiError> {
    let backend: Arc<dyn Backend> = match config.backend.mode {
        BackendMode::Mock => Arc::new(MockBackend::new(
            config.mock.latency_scale,
            config.mock.seed,
        )),
        BackendMode::Live => Arc::new(HttpBackend::new(
            &config.backend.base_url,
            config.timeout(),
        )?),
    };
    tracing::info!(backend = backend.name(), "backend ready");
    Ok(backend)
}

/// Identifier to pass as `csvUploadId` after an upload: taken from the
/// reply when it carries one, else the file name.
pub fn upload_id(reply: &serde_json::Value, file_name: &str) -> String {
    ["csvUploadId", "uploadId", "upload_id", "id"]
        .iter()
        .find_map(|k| reply.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name)
        .to_string()
}

// ─── Boundary validation ────────────────────────────────────────────

/// Sanity checks applied to decoded responses before anything stores them.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

fn unit_interval(name: &str, v: f64) -> Result<(), String> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(format!("{name} {v} outside [0, 1]"))
    }
}

impl Validate for Metrics {
    fn validate(&self) -> Result<(), String> {
        unit_interval("accuracy", self.accuracy)?;
        if !self.log_loss.is_finite() || self.log_loss < 0.0 {
            return Err(format!("log_loss {} is negative", self.log_loss));
        }
        unit_interval("brier_score", self.brier_score)
    }
}

impl Validate for HealthResponse {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for FetchResponse {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for serde_json::Value {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for TrainResponse {
    fn validate(&self) -> Result<(), String> {
        self.metrics.validate()
    }
}

impl Validate for EvaluateResponse {
    fn validate(&self) -> Result<(), String> {
        self.metrics.validate()?;
        let n = self.confusion_matrix.len();
        if n != 3 || self.confusion_matrix.iter().any(|row| row.len() != n) {
            return Err(format!(
                "confusion matrix must be 3x3, got {} rows",
                self.confusion_matrix.len()
            ));
        }
        Ok(())
    }
}

impl Validate for Vec<BacktestFold> {
    fn validate(&self) -> Result<(), String> {
        let mut prev = 0;
        for f in self {
            if f.fold <= prev || (prev == 0 && f.fold != 1) {
                return Err(format!("fold {} out of order after {}", f.fold, prev));
            }
            f.metrics
                .validate()
                .map_err(|e| format!("fold {}: {e}", f.fold))?;
            prev = f.fold;
        }
        Ok(())
    }
}

impl Validate for Vec<PredictionRow> {
    fn validate(&self) -> Result<(), String> {
        for p in self {
            let which = format!("{} vs {}", p.home_team, p.away_team);
            unit_interval("prob_home", p.prob_home).map_err(|e| format!("{which}: {e}"))?;
            unit_interval("prob_draw", p.prob_draw).map_err(|e| format!("{which}: {e}"))?;
            unit_interval("prob_away", p.prob_away).map_err(|e| format!("{which}: {e}"))?;
        }
        Ok(())
    }
}

/// Run [`Validate`] and turn a failure into [`ApiError::Invalid`].
pub fn checked<T: Validate>(value: T) -> Result<T, ApiError> {
    value.validate().map_err(ApiError::Invalid)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(accuracy: f64) -> Metrics {
        Metrics {
            accuracy,
            log_loss: 1.0,
            brier_score: 0.25,
        }
    }

    fn fold(n: u32) -> BacktestFold {
        BacktestFold {
            fold: n,
            train_end: String::new(),
            test_start: String::new(),
            test_end: String::new(),
            metrics: metrics(0.6),
        }
    }

    #[test]
    fn metrics_ranges() {
        assert!(metrics(0.6).validate().is_ok());
        assert!(metrics(1.2).validate().is_err());
        assert!(metrics(f64::NAN).validate().is_err());
        let mut m = metrics(0.6);
        m.log_loss = -0.1;
        assert!(m.validate().is_err());
    }

    #[test]
    fn confusion_matrix_must_be_square() {
        let mut e = EvaluateResponse {
            metrics: metrics(0.5),
            classification_report: String::new(),
            confusion_matrix: vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
        };
        assert!(e.validate().is_ok());
        e.confusion_matrix[1].pop();
        assert!(e.validate().is_err());
    }

    #[test]
    fn folds_ascend_from_one() {
        assert!(vec![fold(1), fold(2), fold(3)].validate().is_ok());
        assert!(vec![fold(2), fold(3)].validate().is_err());
        assert!(vec![fold(1), fold(1)].validate().is_err());
        assert!(Vec::<BacktestFold>::new().validate().is_ok());
    }

    #[test]
    fn checked_maps_to_invalid() {
        let err = checked(metrics(2.0)).unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
    }

    #[test]
    fn upload_id_prefers_reply_field() {
        let reply = serde_json::json!({"uploadId": "abc123"});
        assert_eq!(upload_id(&reply, "m.csv"), "abc123");
        assert_eq!(upload_id(&serde_json::json!({}), "m.csv"), "m.csv");
        assert_eq!(upload_id(&serde_json::json!({"id": ""}), "m.csv"), "m.csv");
    }
}
