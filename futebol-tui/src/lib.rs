//! Futebol 1X2 TUI: six-panel terminal dashboard over the prediction backend.
//!
//! Panels:
//! 1. Dashboard: backend health, latest results, quick actions
//! 2. Data: API fetch, CSV upload and preview
//! 3. Training: train and evaluate, confusion matrix
//! 4. Backtest: time-split folds, chart and export
//! 5. Predictions: 1X2 probabilities with filters and export
//! 6. About: methodology and key bindings

pub mod app;
pub mod clipboard;
pub mod columns;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod theme;
pub mod tickets;
pub mod ui;
pub mod worker;

pub use app::AppState;
