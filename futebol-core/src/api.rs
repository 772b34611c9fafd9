//! Request/response types for the prediction backend.
//!
//! Field names follow the backend's JSON contract (a mix of snake_case and
//! camelCase), so serde renames are applied per field rather than per struct.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Shared ─────────────────────────────────────────────────────────

/// Classification metrics reported by training, evaluation and backtests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Fraction of correct predictions, in [0, 1].
    pub accuracy: f64,
    /// Multiclass log loss, >= 0.
    pub log_loss: f64,
    /// Mean squared error against the one-hot outcome, in [0, 1].
    pub brier_score: f64,
}

/// Match outcome class, ordered Home / Draw / Away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredClass {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl PredClass {
    pub const ALL: [PredClass; 3] = [PredClass::Home, PredClass::Draw, PredClass::Away];

    /// Wire code: `H`, `D` or `A`.
    pub fn code(self) -> &'static str {
        match self {
            PredClass::Home => "H",
            PredClass::Draw => "D",
            PredClass::Away => "A",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PredClass::Home => "Home",
            PredClass::Draw => "Draw",
            PredClass::Away => "Away",
        }
    }

    /// Most probable class; ties resolve Home, then Away, then Draw.
    pub fn from_probabilities(home: f64, draw: f64, away: f64) -> Self {
        if draw > home && draw > away {
            PredClass::Draw
        } else if away > home {
            PredClass::Away
        } else {
            PredClass::Home
        }
    }
}

impl fmt::Display for PredClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ─── Health ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub time: String,
}

// ─── Fetch ──────────────────────────────────────────────────────────

/// Where the backend should pull historical matches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Csv,
    Api,
}

/// Body of `POST /fetch`. Optional fields are omitted from the JSON when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub source: FetchSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "csvUploadId", skip_serializing_if = "Option::is_none")]
    pub csv_upload_id: Option<String>,
}

impl FetchRequest {
    /// Fetch from the official football API. An empty token is sent as absent.
    pub fn api(league: impl Into<String>, season: u16, limit: u32, token: Option<String>) -> Self {
        Self {
            source: FetchSource::Api,
            league: Some(league.into()),
            season: Some(season),
            limit: Some(limit),
            token: token.filter(|t| !t.trim().is_empty()),
            csv_upload_id: None,
        }
    }

    /// Ingest a previously uploaded CSV.
    pub fn csv(upload_id: impl Into<String>) -> Self {
        Self {
            source: FetchSource::Csv,
            league: None,
            season: None,
            limit: None,
            token: None,
            csv_upload_id: Some(upload_id.into()),
        }
    }
}

/// Summary of the dataset the backend holds after a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub rows: u64,
    pub path: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

// ─── Train / evaluate ───────────────────────────────────────────────

/// Body of `POST /train`. A `None` cutoff is sent as `null` (use all data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainRequest {
    pub cutoff: Option<NaiveDate>,
    #[serde(rename = "useXgb")]
    pub use_xgb: bool,
}

impl Default for TrainRequest {
    fn default() -> Self {
        Self {
            cutoff: None,
            use_xgb: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResponse {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub cutoff: NaiveDate,
    #[serde(rename = "trainedAt")]
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub cutoff: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub classification_report: String,
    /// Rows are actual classes, columns predicted, both in [`PredClass::ALL`] order.
    pub confusion_matrix: Vec<Vec<u32>>,
}

// ─── Backtest ───────────────────────────────────────────────────────

pub const MIN_SPLITS: u32 = 2;
pub const MAX_SPLITS: u32 = 10;
pub const DEFAULT_SPLITS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub splits: u32,
    #[serde(rename = "useXgb")]
    pub use_xgb: bool,
}

impl BacktestRequest {
    /// Build a request with `splits` clamped into the supported 2..=10 range.
    pub fn new(splits: u32, use_xgb: bool) -> Self {
        Self {
            splits: splits.clamp(MIN_SPLITS, MAX_SPLITS),
            use_xgb,
        }
    }
}

impl Default for BacktestRequest {
    fn default() -> Self {
        Self::new(DEFAULT_SPLITS, false)
    }
}

/// One time-ordered train/test split of a backtest.
///
/// Window boundaries are kept as the strings the backend sent so exports
/// reproduce them exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestFold {
    pub fold: u32,
    pub train_end: String,
    pub test_start: String,
    pub test_end: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

// ─── Predict ────────────────────────────────────────────────────────

pub const DEFAULT_FIXTURES_PATH: &str = "data/fixtures.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "fixturesCsvPath")]
    pub fixtures_csv_path: String,
}

impl Default for PredictRequest {
    fn default() -> Self {
        Self {
            fixtures_csv_path: DEFAULT_FIXTURES_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub date: String,
    pub league: String,
    pub season: u16,
    pub home_team: String,
    pub away_team: String,
    pub prob_home: f64,
    pub prob_draw: f64,
    pub prob_away: f64,
    pub pred_class: PredClass,
}

// ─── Historical matches ─────────────────────────────────────────────

/// One historical match, as carried in a match-data CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: String,
    pub league: String,
    pub season: u16,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_request_omits_unset_fields() {
        let json = serde_json::to_value(FetchRequest::csv("matches.csv")).unwrap();
        assert_eq!(json["source"], "csv");
        assert_eq!(json["csvUploadId"], "matches.csv");
        assert!(json.get("league").is_none());
        assert!(json.get("token").is_none());
    }

    #[test]
    fn api_fetch_drops_blank_token() {
        let req = FetchRequest::api("PL", 2024, 3000, Some("  ".into()));
        assert!(req.token.is_none());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["season"], 2024);
        assert_eq!(json["limit"], 3000);
    }

    #[test]
    fn train_request_wire_format() {
        let req = TrainRequest {
            cutoff: NaiveDate::from_ymd_opt(2024, 5, 1),
            use_xgb: true,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"cutoff":"2024-05-01","useXgb":true}"#);

        let none = serde_json::to_string(&TrainRequest::default()).unwrap();
        assert_eq!(none, r#"{"cutoff":null,"useXgb":false}"#);
    }

    #[test]
    fn train_response_flattens_metrics() {
        let json = r#"{
            "accuracy": 0.61, "log_loss": 0.98, "brier_score": 0.24,
            "cutoff": "2024-06-30", "trainedAt": "2024-07-01T10:00:00Z"
        }"#;
        let resp: TrainResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.metrics.accuracy, 0.61);
        assert_eq!(resp.cutoff, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn backtest_splits_are_clamped() {
        assert_eq!(BacktestRequest::new(0, false).splits, MIN_SPLITS);
        assert_eq!(BacktestRequest::new(50, false).splits, MAX_SPLITS);
        assert_eq!(BacktestRequest::default().splits, 5);
    }

    #[test]
    fn pred_class_uses_single_letter_codes() {
        let row: PredictionRow = serde_json::from_str(
            r#"{"date":"2025-01-04","league":"Premier League","season":2024,
                "home_team":"Arsenal","away_team":"Chelsea",
                "prob_home":0.5,"prob_draw":0.3,"prob_away":0.2,"pred_class":"H"}"#,
        )
        .unwrap();
        assert_eq!(row.pred_class, PredClass::Home);
        assert!(serde_json::from_str::<PredClass>(r#""X""#).is_err());
    }

    #[test]
    fn most_probable_class() {
        assert_eq!(PredClass::from_probabilities(0.5, 0.3, 0.2), PredClass::Home);
        assert_eq!(PredClass::from_probabilities(0.3, 0.4, 0.3), PredClass::Draw);
        assert_eq!(PredClass::from_probabilities(0.2, 0.3, 0.5), PredClass::Away);
    }
}
