//! Futebol 1X2 core: backend types and transport, tabular view, CSV intake,
//! export and the persisted view state.
//!
//! - Request/response types for the prediction backend
//! - `Backend` trait with live HTTP and mock implementations
//! - Generic search/sort/paginate engine for any row type
//! - CSV file checks and preview
//! - CSV export of backtest folds and predictions
//! - View-state store persisted as JSON
//! - TOML configuration

pub mod api;
pub mod config;
pub mod export;
pub mod intake;
pub mod store;
pub mod table;
pub mod transport;

#[cfg(test)]
mod tests {
    use super::*;

    /// Everything handed to the UI worker crosses threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send_sync<T: Send + Sync>() {}

        require_send_sync::<api::TrainResponse>();
        require_send_sync::<api::EvaluateResponse>();
        require_send_sync::<api::BacktestFold>();
        require_send_sync::<api::PredictionRow>();
        require_send_sync::<api::FetchResponse>();
        require_send_sync::<intake::CsvValidation>();
        require_send_sync::<transport::ApiError>();
        require_send_sync::<intake::IntakeError>();
        require_send_sync::<transport::HttpBackend>();
        require_send_sync::<transport::MockBackend>();
        require_send_sync::<std::sync::Arc<dyn transport::Backend>>();
        require_send_sync::<store::ViewStore>();
    }
}
