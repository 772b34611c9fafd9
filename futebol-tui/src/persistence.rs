//! UI preferences: JSON save/load across restarts.
//!
//! Backend results live in the view store; this file only remembers where
//! the user was and what the forms held.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use futebol_core::api::{BacktestRequest, DEFAULT_SPLITS};

use crate::app::{AppState, Overlay, Panel, DEFAULT_LEAGUE, DEFAULT_LIMIT, DEFAULT_SEASON};

pub const PREFS_FILE: &str = "tui.json";

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub active_panel: Panel,
    pub welcome_dismissed: bool,
    pub league: String,
    pub season: u16,
    pub limit: u32,
    pub train_xgb: bool,
    pub backtest_splits: u32,
    pub backtest_xgb: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Dashboard,
            welcome_dismissed: false,
            league: DEFAULT_LEAGUE.to_string(),
            season: DEFAULT_SEASON,
            limit: DEFAULT_LIMIT,
            train_xgb: false,
            backtest_splits: DEFAULT_SPLITS,
            backtest_xgb: false,
        }
    }
}

/// `<config dir>/futebol-1x2/tui.json`, falling back to the working directory.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("futebol-1x2")
        .join(PREFS_FILE)
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preferences");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        active_panel: app.active_panel,
        welcome_dismissed: app.overlay != Overlay::Welcome,
        league: app.data.league.clone(),
        season: app.data.season,
        limit: app.data.limit,
        train_xgb: app.training.use_xgb,
        backtest_splits: app.backtest.splits,
        backtest_xgb: app.backtest.use_xgb,
    }
}

/// Apply persisted state to AppState.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.active_panel = state.active_panel;
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
    if !state.league.trim().is_empty() {
        app.data.league = state.league;
    }
    app.data.season = state.season;
    if state.limit > 0 {
        app.data.limit = state.limit;
    }
    app.training.use_xgb = state.train_xgb;
    app.backtest.splits = BacktestRequest::new(state.backtest_splits, false).splits;
    app.backtest.use_xgb = state.backtest_xgb;
}
