//! CSV export of backtest folds and predictions.
//!
//! Files are plain comma-joined text: one header line, then one line per
//! row, no quoting. Numbers use their shortest round-trip representation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::api::{BacktestFold, PredictionRow};

pub const BACKTEST_FILE: &str = "backtest_results.csv";
pub const PREDICTIONS_FILE: &str = "predictions.csv";

pub const BACKTEST_HEADERS: [&str; 7] = [
    "Fold",
    "Train End",
    "Test Start",
    "Test End",
    "Accuracy",
    "Log Loss",
    "Brier Score",
];

pub const PREDICTION_HEADERS: [&str; 9] = [
    "Data",
    "Liga",
    "Época",
    "Equipa Casa",
    "Equipa Fora",
    "P(H)",
    "P(D)",
    "P(A)",
    "Previsão",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![])
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(data)?)
}

/// Backtest folds as CSV text.
pub fn backtest_csv(folds: &[BacktestFold]) -> Result<String, ExportError> {
    let mut wtr = writer();
    wtr.write_record(BACKTEST_HEADERS)?;
    for f in folds {
        wtr.write_record([
            f.fold.to_string(),
            f.train_end.clone(),
            f.test_start.clone(),
            f.test_end.clone(),
            f.metrics.accuracy.to_string(),
            f.metrics.log_loss.to_string(),
            f.metrics.brier_score.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Prediction rows as CSV text, in the order given.
pub fn predictions_csv<'a, I>(rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a PredictionRow>,
{
    let mut wtr = writer();
    wtr.write_record(PREDICTION_HEADERS)?;
    for p in rows {
        wtr.write_record([
            p.date.clone(),
            p.league.clone(),
            p.season.to_string(),
            p.home_team.clone(),
            p.away_team.clone(),
            p.prob_home.to_string(),
            p.prob_draw.to_string(),
            p.prob_away.to_string(),
            p.pred_class.code().to_string(),
        ])?;
    }
    finish(wtr)
}

/// Write `contents` to `dir/file_name`, creating `dir` if needed.
pub fn write_file(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name);
    let io_err = |source| ExportError::Io {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    std::fs::write(&path, contents).map_err(io_err)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "export written");
    Ok(path)
}

/// Write `backtest_results.csv` under `dir`.
pub fn export_backtest(dir: &Path, folds: &[BacktestFold]) -> Result<PathBuf, ExportError> {
    if folds.is_empty() {
        return Err(ExportError::Empty);
    }
    write_file(dir, BACKTEST_FILE, &backtest_csv(folds)?)
}

/// Write `predictions.csv` under `dir`. An empty selection is refused.
pub fn export_predictions(dir: &Path, rows: &[&PredictionRow]) -> Result<PathBuf, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    write_file(dir, PREDICTIONS_FILE, &predictions_csv(rows.iter().copied())?)
}
