//! Local stand-in for the prediction backend.
//!
//! Results are random but shaped like the real thing, and every call
//! sleeps for a fixed, scalable delay so the UI's pending states show.

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use super::{ApiError, Backend};
use crate::api::{
    BacktestFold, BacktestRequest, EvaluateRequest, EvaluateResponse, FetchRequest, FetchResponse,
    HealthResponse, HealthStatus, Metrics, PredClass, PredictRequest, PredictionRow, TrainRequest,
    TrainResponse,
};

/// Simulated latency per operation, in milliseconds.
mod delay {
    pub const HEALTH: u64 = 500;
    pub const FETCH: u64 = 1500;
    pub const TRAIN: u64 = 2500;
    pub const EVALUATE: u64 = 2000;
    pub const BACKTEST: u64 = 3000;
    pub const PREDICT: u64 = 2000;
    pub const UPLOAD: u64 = 1000;
}

pub const MOCK_DATA_PATH: &str = "data/matches_clean.csv";

const CLASSIFICATION_REPORT: &str = "              precision    recall  f1-score   support

           H       0.62      0.58      0.60       245
           D       0.41      0.35      0.38       198
           A       0.55      0.62      0.58       207

    accuracy                           0.52       650
   macro avg       0.53      0.52      0.52       650
weighted avg       0.54      0.52      0.53       650";

const CONFUSION_MATRIX: [[u32; 3]; 3] = [[142, 48, 55], [65, 69, 64], [45, 33, 129]];

const FIXTURES: [(&str, &str, &str); 10] = [
    ("Arsenal", "Chelsea", "Premier League"),
    ("Liverpool", "Manchester United", "Premier League"),
    ("Barcelona", "Real Madrid", "La Liga"),
    ("Bayern Munich", "Borussia Dortmund", "Bundesliga"),
    ("Juventus", "AC Milan", "Serie A"),
    ("PSG", "Lyon", "Ligue 1"),
    ("Benfica", "Porto", "Primeira Liga"),
    ("Sporting", "Braga", "Primeira Liga"),
    ("Ajax", "PSV", "Eredivisie"),
    ("Inter Milan", "Napoli", "Serie A"),
];

pub struct MockBackend {
    rng: Mutex<StdRng>,
    latency_scale: f64,
}

impl MockBackend {
    /// `latency_scale` multiplies every simulated delay; `seed` makes runs repeatable.
    pub fn new(latency_scale: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            latency_scale: latency_scale.max(0.0),
        }
    }

    /// No delays; for tests and scripted use.
    pub fn instant(seed: u64) -> Self {
        Self::new(0.0, Some(seed))
    }

    fn pause(&self, base_ms: u64) {
        let ms = (base_ms as f64 * self.latency_scale).round() as u64;
        if ms > 0 {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    fn metrics(&self) -> Metrics {
        self.with_rng(|rng| Metrics {
            accuracy: 0.58 + rng.gen::<f64>() * 0.1,
            log_loss: 0.95 + rng.gen::<f64>() * 0.15,
            brier_score: 0.23 + rng.gen::<f64>() * 0.05,
        })
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Midnight UTC in the `2024-03-01T00:00:00.000Z` form.
fn iso_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Fold `i` trains up to `2i` months after the base date, then tests on the
/// following month.
fn fold_window(base: NaiveDate, i: u32) -> Option<(NaiveDate, NaiveDate, NaiveDate)> {
    let train_end = base.checked_add_months(Months::new(2 * i))?;
    let test_start = train_end.succ_opt()?;
    let test_end = test_start.checked_add_months(Months::new(1))?;
    Some((train_end, test_start, test_end))
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn health(&self) -> Result<HealthResponse, ApiError> {
        self.pause(delay::HEALTH);
        Ok(HealthResponse {
            status: HealthStatus::Ok,
            time: Utc::now().to_rfc3339(),
        })
    }

    fn fetch(&self, req: &FetchRequest) -> Result<FetchResponse, ApiError> {
        tracing::debug!(source = ?req.source, "mock fetch");
        self.pause(delay::FETCH);
        Ok(FetchResponse {
            rows: self.with_rng(|rng| rng.gen_range(1000..3000)),
            path: MOCK_DATA_PATH.to_string(),
            updated_at: Utc::now(),
        })
    }

    fn train(&self, req: &TrainRequest) -> Result<TrainResponse, ApiError> {
        self.pause(delay::TRAIN);
        Ok(TrainResponse {
            metrics: self.metrics(),
            cutoff: req.cutoff.unwrap_or_else(|| Utc::now().date_naive()),
            trained_at: Utc::now(),
        })
    }

    fn evaluate(&self, _req: &EvaluateRequest) -> Result<EvaluateResponse, ApiError> {
        self.pause(delay::EVALUATE);
        Ok(EvaluateResponse {
            metrics: self.metrics(),
            classification_report: CLASSIFICATION_REPORT.to_string(),
            confusion_matrix: CONFUSION_MATRIX.iter().map(|r| r.to_vec()).collect(),
        })
    }

    fn backtest(&self, req: &BacktestRequest) -> Result<Vec<BacktestFold>, ApiError> {
        self.pause(delay::BACKTEST);
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .ok_or_else(|| ApiError::Invalid("bad base date".into()))?;
        (1..=req.splits)
            .map(|i| -> Result<BacktestFold, ApiError> {
                let (train_end, test_start, test_end) = fold_window(base, i)
                    .ok_or_else(|| ApiError::Invalid(format!("fold {i} out of calendar range")))?;
                Ok(BacktestFold {
                    fold: i,
                    train_end: iso_midnight(train_end),
                    test_start: iso_midnight(test_start),
                    test_end: iso_midnight(test_end),
                    metrics: self.metrics(),
                })
            })
            .collect()
    }

    fn predict(&self, req: &PredictRequest) -> Result<Vec<PredictionRow>, ApiError> {
        tracing::debug!(fixtures = %req.fixtures_csv_path, "mock predict");
        self.pause(delay::PREDICT);
        let today = Utc::now().date_naive();
        Ok(FIXTURES
            .iter()
            .zip(1u64..)
            .map(|(&(home, away, league), offset)| {
                // Away keeps at least 5% so the three never go negative.
                let (p_home, p_draw) =
                    self.with_rng(|rng| (0.25 + rng.gen::<f64>() * 0.3, 0.2 + rng.gen::<f64>() * 0.2));
                let p_away = 1.0 - p_home - p_draw;
                let date = today
                    .checked_add_days(chrono::Days::new(offset))
                    .unwrap_or(today);
                PredictionRow {
                    date: date.format("%Y-%m-%d").to_string(),
                    league: league.to_string(),
                    season: 2024,
                    home_team: home.to_string(),
                    away_team: away.to_string(),
                    prob_home: round3(p_home),
                    prob_draw: round3(p_draw),
                    prob_away: round3(p_away),
                    pred_class: PredClass::from_probabilities(p_home, p_draw, p_away),
                }
            })
            .collect())
    }

    fn upload_csv(&self, path: &Path) -> Result<serde_json::Value, ApiError> {
        let meta = std::fs::metadata(path).map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.pause(delay::UPLOAD);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(json!({
            "uploadId": name,
            "filename": name,
            "bytes": meta.len(),
        }))
    }
}
