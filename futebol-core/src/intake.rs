//! CSV intake: size and extension pre-checks, header check, preview.
//!
//! Both ways of choosing a file in the UI (pasting a dropped path, typing
//! one at a prompt) end up in [`validate_file`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::api::MatchRecord;
use crate::table::{CellValue, TableRow};

pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

/// Columns a historical match file must carry.
pub const MATCH_COLUMNS: &[&str] = &[
    "date",
    "league",
    "season",
    "home_team",
    "away_team",
    "home_goals",
    "away_goals",
];

/// Columns a fixtures file (matches still to be played) must carry.
pub const FIXTURE_COLUMNS: &[&str] = &["date", "league", "season", "home_team", "away_team"];

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("File too large. Maximum: {max_mb}MB")]
    TooLarge { size: u64, max_mb: u64 },

    #[error("Please select a {extension} file")]
    WrongExtension { extension: String },

    #[error("Missing required columns: {}.", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Limits and expectations applied to a candidate file.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeOptions {
    pub max_bytes: u64,
    pub extension: String,
    pub required_columns: Vec<String>,
    pub preview_rows: usize,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            extension: ".csv".to_string(),
            required_columns: Vec::new(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl IntakeOptions {
    pub fn requiring(columns: &[&str]) -> Self {
        Self {
            required_columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn for_matches() -> Self {
        Self::requiring(MATCH_COLUMNS)
    }

    pub fn for_fixtures() -> Self {
        Self::requiring(FIXTURE_COLUMNS)
    }

    pub fn with_limits(mut self, max_bytes: u64, preview_rows: usize) -> Self {
        self.max_bytes = max_bytes;
        self.preview_rows = preview_rows;
        self
    }

    fn max_megabytes(&self) -> u64 {
        (self.max_bytes as f64 / (1024.0 * 1024.0)).round() as u64
    }
}

/// One preview line keyed by (lower-cased) header, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewRow(pub Vec<(String, String)>);

impl PreviewRow {
    /// Value under `header`. With duplicate headers the last one wins.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }
}

impl TableRow for PreviewRow {
    fn field(&self, key: &str) -> CellValue {
        match self.get(key) {
            Some(v) => CellValue::text(v),
            None => CellValue::Empty,
        }
    }
}

/// Outcome of checking one file.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvValidation {
    pub path: PathBuf,
    pub valid: bool,
    pub errors: Vec<String>,
    pub headers: Vec<String>,
    pub preview: Vec<PreviewRow>,
    /// Data rows (non-blank records minus the header).
    pub row_count: usize,
}

impl CsvValidation {
    /// The file, if it may be handed on to an upload or prediction.
    pub fn accepted(&self) -> Option<&Path> {
        self.valid.then_some(self.path.as_path())
    }

    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    /// Preview rows that parse as full match records.
    pub fn match_records(&self) -> Vec<MatchRecord> {
        self.preview
            .iter()
            .filter_map(MatchRecord::from_preview)
            .collect()
    }
}

impl MatchRecord {
    /// Build a record from a preview row; `None` if a column is absent or a
    /// number does not parse.
    pub fn from_preview(row: &PreviewRow) -> Option<Self> {
        Some(Self {
            date: row.get("date")?.to_string(),
            league: row.get("league")?.to_string(),
            season: row.get("season")?.parse().ok()?,
            home_team: row.get("home_team")?.to_string(),
            away_team: row.get("away_team")?.to_string(),
            home_goals: row.get("home_goals")?.parse().ok()?,
            away_goals: row.get("away_goals")?.parse().ok()?,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Check a file on disk. Size and extension failures short-circuit as `Err`
/// before the file is read; a header mismatch is an invalid [`CsvValidation`].
pub fn validate_file(path: &Path, opts: &IntakeOptions) -> Result<CsvValidation, IntakeError> {
    let io_err = |source| IntakeError::Io {
        path: path.to_path_buf(),
        source,
    };
    let size = std::fs::metadata(path).map_err(io_err)?.len();
    precheck(&file_name(path), size, opts)?;

    let bytes = std::fs::read(path).map_err(io_err)?;
    let validation = inspect(path, &bytes, opts).map_err(io_err)?;
    tracing::debug!(
        path = %path.display(),
        rows = validation.row_count,
        valid = validation.valid,
        "validated csv"
    );
    Ok(validation)
}

/// Same checks as [`validate_file`] over in-memory content.
pub fn validate_bytes(
    name: &str,
    bytes: &[u8],
    opts: &IntakeOptions,
) -> Result<CsvValidation, IntakeError> {
    precheck(name, bytes.len() as u64, opts)?;
    inspect(Path::new(name), bytes, opts).map_err(|source| IntakeError::Io {
        path: PathBuf::from(name),
        source,
    })
}

fn precheck(name: &str, size: u64, opts: &IntakeOptions) -> Result<(), IntakeError> {
    if size > opts.max_bytes {
        return Err(IntakeError::TooLarge {
            size,
            max_mb: opts.max_megabytes(),
        });
    }
    if !name.ends_with(&opts.extension) {
        return Err(IntakeError::WrongExtension {
            extension: opts.extension.clone(),
        });
    }
    Ok(())
}

fn inspect(path: &Path, bytes: &[u8], opts: &IntakeOptions) -> std::io::Result<CsvValidation> {
    // Stray non-UTF-8 bytes become U+FFFD; the header check still runs.
    let text = String::from_utf8_lossy(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let blank = record.iter().all(str::is_empty) && record.len() <= 1;
        if !blank {
            records.push(record);
        }
    }

    let headers: Vec<String> = records
        .first()
        .map(|h| h.iter().map(str::to_lowercase).collect())
        .unwrap_or_default();

    let missing: Vec<String> = opts
        .required_columns
        .iter()
        .filter(|col| !headers.contains(&col.to_lowercase()))
        .cloned()
        .collect();

    let preview = records
        .iter()
        .skip(1)
        .take(opts.preview_rows)
        .map(|rec| {
            PreviewRow(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), rec.get(i).unwrap_or_default().to_string()))
                    .collect(),
            )
        })
        .collect();

    let valid = missing.is_empty();
    let errors = if valid {
        Vec::new()
    } else {
        vec![IntakeError::MissingColumns { missing }.to_string()]
    };

    Ok(CsvValidation {
        path: path.to_path_buf(),
        valid,
        errors,
        headers,
        preview,
        row_count: records.len().saturating_sub(1),
    })
}
