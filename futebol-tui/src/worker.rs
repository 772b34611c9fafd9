//! Background worker thread: every backend call and file check runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Jobs run
//! on a private rayon::ThreadPool (not the global pool) so a slow training
//! call does not hold up a prediction issued after it.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use futebol_core::api::{
    BacktestFold, BacktestRequest, EvaluateRequest, EvaluateResponse, FetchRequest, FetchResponse,
    HealthResponse, PredictRequest, PredictionRow, TrainRequest, TrainResponse,
};
use futebol_core::intake::{self, CsvValidation, IntakeOptions};
use futebol_core::transport::{self, ApiError, Backend};

use crate::app::ErrorCategory;
use crate::tickets::Ticket;

const POOL_THREADS: usize = 4;

/// Work the TUI can hand off.
#[derive(Debug, Clone)]
pub enum Job {
    Health,
    Fetch(FetchRequest),
    /// Post the file to the backend, then fetch with the returned upload id.
    UploadAndFetch {
        path: PathBuf,
    },
    Train(TrainRequest),
    Evaluate(EvaluateRequest),
    Backtest(BacktestRequest),
    Predict(PredictRequest),
    ValidateCsv {
        path: PathBuf,
        options: IntakeOptions,
    },
}

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Run { ticket: Ticket, job: Job },
    Shutdown,
}

/// Successful results, one per job kind.
#[derive(Debug, Clone)]
pub enum Outcome {
    Health(HealthResponse),
    Fetched(FetchResponse),
    Trained(TrainResponse),
    Evaluated(EvaluateResponse),
    Backtested(Vec<BacktestFold>),
    Predicted(Vec<PredictionRow>),
    /// A file check finished; a rejected file is a normal outcome.
    Checked {
        path: PathBuf,
        result: Result<CsvValidation, String>,
    },
}

#[derive(Debug, Clone)]
pub struct Failure {
    pub category: ErrorCategory,
    pub detail: String,
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        let category = match &err {
            ApiError::Status { .. } | ApiError::Network(_) => ErrorCategory::Network,
            ApiError::Decode(_) | ApiError::Invalid(_) => ErrorCategory::Backend,
            ApiError::Io { .. } => ErrorCategory::Data,
        };
        Self {
            category,
            detail: err.to_string(),
        }
    }
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub ticket: Ticket,
    pub outcome: Result<Outcome, Failure>,
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    backend: Arc<dyn Backend>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("futebol-worker".into())
        .spawn(move || worker_loop(backend, rx, tx))
}

fn worker_loop(backend: Arc<dyn Backend>, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(POOL_THREADS)
        .thread_name(|i| format!("futebol-pool-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::error!(error = %e, "worker pool unavailable, running jobs inline");
            None
        }
    };

    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Run { ticket, job }) => {
                let backend = Arc::clone(&backend);
                let tx = tx.clone();
                let task = move || {
                    let outcome = run_job(backend.as_ref(), job);
                    // Receiver gone means the UI is shutting down.
                    let _ = tx.send(WorkerResponse { ticket, outcome });
                };
                match &pool {
                    Some(pool) => pool.spawn(task),
                    None => task(),
                }
            }
        }
    }
}

/// Execute one job to completion.
pub fn run_job(backend: &dyn Backend, job: Job) -> Result<Outcome, Failure> {
    let outcome = match job {
        Job::Health => Outcome::Health(backend.health()?),
        Job::Fetch(req) => Outcome::Fetched(backend.fetch(&req)?),
        Job::UploadAndFetch { path } => {
            let reply = backend.upload_csv(&path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = transport::upload_id(&reply, &file_name);
            tracing::info!(upload_id = %id, "upload accepted, fetching");
            Outcome::Fetched(backend.fetch(&FetchRequest::csv(id))?)
        }
        Job::Train(req) => Outcome::Trained(backend.train(&req)?),
        Job::Evaluate(req) => Outcome::Evaluated(backend.evaluate(&req)?),
        Job::Backtest(req) => Outcome::Backtested(backend.backtest(&req)?),
        Job::Predict(req) => Outcome::Predicted(backend.predict(&req)?),
        Job::ValidateCsv { path, options } => {
            let result = intake::validate_file(&path, &options).map_err(|e| e.to_string());
            Outcome::Checked { path, result }
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    use futebol_core::transport::MockBackend;

    use crate::tickets::Action;

    fn ticket(action: Action) -> Ticket {
        Ticket {
            action,
            generation: 1,
        }
    }

    #[test]
    fn jobs_round_trip_through_the_worker() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(MockBackend::instant(1)), cmd_rx, resp_tx).unwrap();

        cmd_tx
            .send(WorkerCommand::Run {
                ticket: ticket(Action::Backtest),
                job: Job::Backtest(BacktestRequest::new(4, false)),
            })
            .unwrap();
        let resp = resp_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(resp.ticket.action, Action::Backtest);
        match resp.outcome {
            Ok(Outcome::Backtested(folds)) => assert_eq!(folds.len(), 4),
            other => panic!("unexpected outcome: {other:?}"),
        }

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn upload_failure_is_a_data_failure() {
        let err = run_job(
            &MockBackend::instant(2),
            Job::UploadAndFetch {
                path: PathBuf::from("/no/such/file.csv"),
            },
        )
        .unwrap_err();
        assert_eq!(err.category, ErrorCategory::Data);
    }

    #[test]
    fn rejected_file_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "date,league\n").unwrap();
        let outcome = run_job(
            &MockBackend::instant(3),
            Job::ValidateCsv {
                path,
                options: IntakeOptions::for_matches(),
            },
        )
        .unwrap();
        match outcome {
            Outcome::Checked { result: Err(msg), .. } => {
                assert_eq!(msg, "Please select a .csv file")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
