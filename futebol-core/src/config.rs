//! Application configuration, read from `futebol.toml`.
//!
//! Every field has a default, so an absent file or a partial one is fine.
//!
//! ```toml
//! [backend]
//! mode = "live"
//! base_url = "https://gts-stats-backend.onrender.com"
//!
//! [ui]
//! page_size = 20
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intake::{IntakeOptions, DEFAULT_MAX_BYTES, DEFAULT_PREVIEW_ROWS};
use crate::table::DEFAULT_PAGE_SIZE;

pub const CONFIG_FILE: &str = "futebol.toml";
pub const DEFAULT_BASE_URL: &str = "https://gts-stats-backend.onrender.com";

/// Setting this variable switches to the live backend at the given URL.
pub const BACKEND_URL_ENV: &str = "FUTEBOL_BACKEND_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Mock,
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Mock,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Multiplier on the simulated latencies; 0 disables them.
    pub latency_scale: f64,
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_scale: 1.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub max_bytes: u64,
    pub preview_rows: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub page_size: usize,
    pub export_dir: PathBuf,
    /// Overrides the state file location.
    pub state_path: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            export_dir: PathBuf::from("exports"),
            state_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub mock: MockConfig,
    pub intake: IntakeConfig,
    pub ui: UiConfig,
}

impl Config {
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Resolve configuration: the explicit path if given, else
    /// `./futebol.toml` when present, else defaults. The backend URL
    /// environment variable is applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_backend_url(std::env::var(BACKEND_URL_ENV).ok());
        Ok(config)
    }

    /// Point at a live backend when `url` is set and non-blank.
    pub fn apply_backend_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(%url, "backend url override");
            self.backend.base_url = url.trim().to_string();
            self.backend.mode = BackendMode::Live;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.base_url is empty".into()));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid("backend.timeout_secs must be > 0".into()));
        }
        if !self.mock.latency_scale.is_finite() || self.mock.latency_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mock.latency_scale must be a non-negative number, got {}",
                self.mock.latency_scale
            )));
        }
        if self.ui.page_size == 0 {
            return Err(ConfigError::Invalid("ui.page_size must be > 0".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Intake limits from this config with the given required columns.
    pub fn intake_options(&self, required: &[&str]) -> IntakeOptions {
        IntakeOptions::requiring(required)
            .with_limits(self.intake.max_bytes, self.intake.preview_rows)
    }

    /// Where the view state lives, if a location can be determined.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.ui
            .state_path
            .clone()
            .or_else(crate::store::default_path)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Config, ConfigError> {
        Config::from_toml(s, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let c = parse("").unwrap();
        assert_eq!(c, Config::default());
        assert_eq!(c.backend.mode, BackendMode::Mock);
        assert_eq!(c.ui.page_size, 10);
        assert_eq!(c.intake.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = parse("[backend]\nmode = \"live\"\n\n[ui]\npage_size = 25\n").unwrap();
        assert_eq!(c.backend.mode, BackendMode::Live);
        assert_eq!(c.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.ui.page_size, 25);
        assert_eq!(c.ui.export_dir, PathBuf::from("exports"));
    }

    #[test]
    fn rejects_zero_page_size() {
        assert!(matches!(
            parse("[ui]\npage_size = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_negative_latency() {
        assert!(parse("[mock]\nlatency_scale = -1.0\n").is_err());
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        assert!(matches!(
            parse("[backend]\nmode = \"cloud\"\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn url_override_switches_to_live() {
        let mut c = Config::default();
        c.apply_backend_url(Some("  ".into()));
        assert_eq!(c.backend.mode, BackendMode::Mock);
        c.apply_backend_url(Some("http://localhost:8000".into()));
        assert_eq!(c.backend.mode, BackendMode::Live);
        assert_eq!(c.backend.base_url, "http://localhost:8000");
    }

    #[test]
    fn explicit_state_path_wins() {
        let mut c = Config::default();
        c.ui.state_path = Some(PathBuf::from("/tmp/state.json"));
        assert_eq!(c.state_path(), Some(PathBuf::from("/tmp/state.json")));
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = Config::default();
        c.mock.seed = Some(7);
        let text = c.to_toml().unwrap();
        assert_eq!(parse(&text).unwrap(), c);
    }

    #[test]
    fn intake_options_carry_limits() {
        let mut c = Config::default();
        c.intake.max_bytes = 1024;
        let opts = c.intake_options(crate::intake::FIXTURE_COLUMNS);
        assert_eq!(opts.max_bytes, 1024);
        assert_eq!(opts.required_columns.len(), 5);
    }
}
