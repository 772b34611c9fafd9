//! Futebol 1X2 CLI: backend operations, CSV checks, export and saved state.
//!
//! Commands:
//! - `health`: ping the backend
//! - `fetch`: load a league season from the API
//! - `upload`: send a match CSV, then load it
//! - `train` / `evaluate`: fit and score the model
//! - `backtest`: time-split evaluation
//! - `predict`: 1X2 probabilities for a fixtures file
//! - `validate`: check a CSV locally without sending it
//! - `export`: write saved backtest or predictions as CSV
//! - `state show` / `state clear`: inspect or wipe the saved results
//!
//! Results are saved to the same view-state file the TUI reads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use futebol_core::api::{
    BacktestRequest, EvaluateRequest, FetchRequest, HealthStatus, PredictRequest, TrainRequest,
    DEFAULT_FIXTURES_PATH, DEFAULT_SPLITS, MAX_SPLITS, MIN_SPLITS,
};
use futebol_core::config::{BackendMode, Config};
use futebol_core::export;
use futebol_core::intake::{self, FIXTURE_COLUMNS, MATCH_COLUMNS};
use futebol_core::store::ViewStore;
use futebol_core::transport::{self, Backend};

#[derive(Parser)]
#[command(
    name = "futebol",
    version,
    about = "Futebol 1X2 CLI: football match outcome predictions"
)]
struct Cli {
    /// Path to a futebol.toml. Defaults to ./futebol.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the local mock backend regardless of configuration.
    #[arg(long, global = true, default_value_t = false)]
    mock: bool,

    /// Print results as JSON instead of a summary.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is reachable.
    Health,
    /// Load match data for a league season from the football API.
    Fetch {
        /// Competition code (e.g., PL, PD, SA, BL1).
        #[arg(long, default_value = "PL")]
        league: String,

        /// Season start year.
        #[arg(long, default_value_t = 2024)]
        season: u16,

        /// Maximum number of matches.
        #[arg(long, default_value_t = 3000)]
        limit: u32,

        /// API token, if the backend needs one.
        #[arg(long)]
        token: Option<String>,
    },
    /// Upload a match CSV and load it as the dataset.
    Upload {
        /// CSV file with the match columns.
        path: PathBuf,
    },
    /// Train the model.
    Train {
        /// Only use matches up to this date (YYYY-MM-DD).
        #[arg(long)]
        cutoff: Option<String>,

        /// Use the gradient-boosted model.
        #[arg(long, default_value_t = false)]
        xgb: bool,
    },
    /// Evaluate the trained model.
    Evaluate {
        /// Only use matches up to this date (YYYY-MM-DD).
        #[arg(long)]
        cutoff: Option<String>,

        /// Also print the classification report.
        #[arg(long, default_value_t = false)]
        report: bool,
    },
    /// Run a time-split backtest.
    Backtest {
        /// Number of splits, clamped to the supported range.
        #[arg(long, default_value_t = DEFAULT_SPLITS)]
        splits: u32,

        /// Use the gradient-boosted model.
        #[arg(long, default_value_t = false)]
        xgb: bool,
    },
    /// Predict home/draw/away probabilities for upcoming fixtures.
    Predict {
        /// Fixtures CSV path as the backend sees it.
        #[arg(long, default_value = DEFAULT_FIXTURES_PATH)]
        fixtures: String,
    },
    /// Check a CSV file locally: extension, size, required columns.
    Validate {
        path: PathBuf,

        /// Which column set the file must carry.
        #[arg(long, value_enum, default_value_t = CsvKind::Matches)]
        kind: CsvKind,
    },
    /// Write saved results as CSV.
    Export {
        #[arg(value_enum)]
        what: ExportKind,

        /// Output directory. Defaults to ui.export_dir from the config.
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Only export predictions whose home or away team contains this text.
        #[arg(long)]
        team: Option<String>,

        /// Only export predictions for this league.
        #[arg(long)]
        league: Option<String>,
    },
    /// Saved view state.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CsvKind {
    Matches,
    Fixtures,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Backtest,
    Predictions,
}

#[derive(Subcommand)]
enum StateAction {
    /// Summarize what is saved.
    Show,
    /// Remove every saved result.
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.mock {
        config.backend.mode = BackendMode::Mock;
    }

    let mut store = match config.state_path() {
        Some(path) => ViewStore::open(path),
        None => ViewStore::in_memory(),
    };

    let json = cli.json;
    match cli.command {
        Commands::Health => run_health(&*backend(&config)?, json),
        Commands::Fetch {
            league,
            season,
            limit,
            token,
        } => {
            let req = FetchRequest::api(league, season, limit, token);
            run_fetch(&*backend(&config)?, &mut store, &req, json)
        }
        Commands::Upload { path } => run_upload(&*backend(&config)?, &config, &mut store, &path, json),
        Commands::Train { cutoff, xgb } => {
            let req = TrainRequest {
                cutoff: parse_date(cutoff.as_deref())?,
                use_xgb: xgb,
            };
            run_train(&*backend(&config)?, &mut store, &req, json)
        }
        Commands::Evaluate { cutoff, report } => {
            let req = EvaluateRequest {
                cutoff: parse_date(cutoff.as_deref())?,
            };
            run_evaluate(&*backend(&config)?, &mut store, &req, report, json)
        }
        Commands::Backtest { splits, xgb } => {
            let req = BacktestRequest::new(splits, xgb);
            if req.splits != splits {
                eprintln!("splits clamped to {} ({MIN_SPLITS}-{MAX_SPLITS})", req.splits);
            }
            run_backtest(&*backend(&config)?, &mut store, &req, json)
        }
        Commands::Predict { fixtures } => {
            let req = PredictRequest {
                fixtures_csv_path: fixtures,
            };
            run_predict(&*backend(&config)?, &mut store, &req, json)
        }
        Commands::Validate { path, kind } => run_validate(&config, &path, kind, json),
        Commands::Export {
            what,
            dir,
            team,
            league,
        } => {
            let dir = dir.unwrap_or_else(|| config.ui.export_dir.clone());
            run_export(&store, what, &dir, team.as_deref(), league.as_deref())
        }
        Commands::State { action } => match action {
            StateAction::Show => run_state_show(&store, json),
            StateAction::Clear => {
                store.clear_all()?;
                println!("Saved results cleared");
                Ok(())
            }
        },
    }
}

fn backend(config: &Config) -> Result<Arc<dyn Backend>> {
    transport::from_config(config).context("creating backend")
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_health(backend: &dyn Backend, json: bool) -> Result<()> {
    let health = backend.health()?;
    if json {
        return print_json(&health);
    }
    match health.status {
        HealthStatus::Ok => println!("{}: ok ({})", backend.name(), health.time),
        HealthStatus::Error => bail!("{} reports an error ({})", backend.name(), health.time),
    }
    Ok(())
}

fn run_fetch(
    backend: &dyn Backend,
    store: &mut ViewStore,
    req: &FetchRequest,
    json: bool,
) -> Result<()> {
    let info = backend.fetch(req)?;
    if json {
        print_json(&info)?;
    } else {
        println!("Loaded {} rows into {}", info.rows, info.path);
    }
    store.set_data_info(Some(info))?;
    Ok(())
}

fn run_upload(
    backend: &dyn Backend,
    config: &Config,
    store: &mut ViewStore,
    path: &Path,
    json: bool,
) -> Result<()> {
    let validation = intake::validate_file(path, &config.intake_options(MATCH_COLUMNS))?;
    if !validation.valid {
        bail!("{}", validation.errors.join(" "));
    }
    let reply = backend.upload_csv(path)?;
    let id = transport::upload_id(&reply, &validation.file_name());
    tracing::info!(upload_id = %id, "uploaded");
    run_fetch(backend, store, &FetchRequest::csv(id), json)
}

fn run_train(
    backend: &dyn Backend,
    store: &mut ViewStore,
    req: &TrainRequest,
    json: bool,
) -> Result<()> {
    let trained = backend.train(req)?;
    if json {
        print_json(&trained)?;
    } else {
        println!("Trained at {} (cutoff {})", trained.trained_at, trained.cutoff);
        print_metrics(&trained.metrics);
    }
    store.record_training(trained)?;
    Ok(())
}

fn run_evaluate(
    backend: &dyn Backend,
    store: &mut ViewStore,
    req: &EvaluateRequest,
    report: bool,
    json: bool,
) -> Result<()> {
    let eval = backend.evaluate(req)?;
    if json {
        print_json(&eval)?;
    } else {
        print_metrics(&eval.metrics);
        println!();
        println!("{:>8} {:>6} {:>6} {:>6}", "", "H", "D", "A");
        for (label, row) in ["H", "D", "A"].iter().zip(&eval.confusion_matrix) {
            let cells: Vec<String> = row.iter().map(|v| format!("{v:>6}")).collect();
            println!("{label:>8} {}", cells.join(" "));
        }
        if report {
            println!();
            println!("{}", eval.classification_report);
        }
    }
    store.set_last_evaluation(Some(eval))?;
    Ok(())
}

fn run_backtest(
    backend: &dyn Backend,
    store: &mut ViewStore,
    req: &BacktestRequest,
    json: bool,
) -> Result<()> {
    let folds = backend.backtest(req)?;
    if json {
        print_json(&folds)?;
    } else {
        println!(
            "{:<5} {:<12} {:<12} {:<12} {:>9} {:>9} {:>7}",
            "Fold", "Train End", "Test Start", "Test End", "Accuracy", "Log Loss", "Brier"
        );
        println!("{}", "-".repeat(72));
        for f in &folds {
            println!(
                "{:<5} {:<12} {:<12} {:<12} {:>8.1}% {:>9.3} {:>7.3}",
                f.fold,
                day(&f.train_end),
                day(&f.test_start),
                day(&f.test_end),
                f.metrics.accuracy * 100.0,
                f.metrics.log_loss,
                f.metrics.brier_score
            );
        }
    }
    store.set_last_backtest(Some(folds))?;
    Ok(())
}

fn run_predict(
    backend: &dyn Backend,
    store: &mut ViewStore,
    req: &PredictRequest,
    json: bool,
) -> Result<()> {
    let rows = backend.predict(req)?;
    if json {
        print_json(&rows)?;
    } else {
        println!(
            "{:<10} {:<16} {:<20} {:<20} {:>6} {:>6} {:>6} {:>4}",
            "Date", "League", "Home", "Away", "P(H)", "P(D)", "P(A)", "Pick"
        );
        println!("{}", "-".repeat(96));
        for r in &rows {
            println!(
                "{:<10} {:<16} {:<20} {:<20} {:>5.1}% {:>5.1}% {:>5.1}% {:>4}",
                r.date,
                r.league,
                r.home_team,
                r.away_team,
                r.prob_home * 100.0,
                r.prob_draw * 100.0,
                r.prob_away * 100.0,
                r.pred_class.code()
            );
        }
    }
    store.set_predictions(rows)?;
    Ok(())
}

fn run_validate(config: &Config, path: &Path, kind: CsvKind, json: bool) -> Result<()> {
    let required = match kind {
        CsvKind::Matches => MATCH_COLUMNS,
        CsvKind::Fixtures => FIXTURE_COLUMNS,
    };
    let v = intake::validate_file(path, &config.intake_options(required))?;
    if json {
        return print_json(&serde_json::json!({
            "path": v.path,
            "valid": v.valid,
            "errors": v.errors,
            "headers": v.headers,
            "rows": v.row_count,
        }));
    }
    println!("{}: {} rows, {} columns", v.file_name(), v.row_count, v.headers.len());
    if !v.valid {
        bail!("{}", v.errors.join(" "));
    }
    println!("OK");
    Ok(())
}

fn run_export(
    store: &ViewStore,
    what: ExportKind,
    dir: &Path,
    team: Option<&str>,
    league: Option<&str>,
) -> Result<()> {
    let written = match what {
        ExportKind::Backtest => {
            let folds = store
                .last_backtest()
                .context("no saved backtest; run `futebol backtest` first")?;
            export::export_backtest(dir, folds)?
        }
        ExportKind::Predictions => {
            let query = team.unwrap_or("");
            let rows: Vec<_> = futebol_core::table::filter_rows(
                store.predictions(),
                &["home_team", "away_team"],
                query,
            )
            .into_iter()
            .filter(|r| league.map_or(true, |l| r.league == l))
            .collect();
            export::export_predictions(dir, &rows)?
        }
    };
    println!("Exported {}", written.display());
    Ok(())
}

fn run_state_show(store: &ViewStore, json: bool) -> Result<()> {
    if json {
        return print_json(store.state());
    }
    match store.path() {
        Some(path) => println!("State file: {}", path.display()),
        None => println!("State file: (in memory)"),
    }
    match store.data_info() {
        Some(info) => println!("Dataset:     {} rows ({})", info.rows, info.path),
        None => println!("Dataset:     -"),
    }
    match store.last_training() {
        Some(t) => println!(
            "Training:    accuracy {:.1}% at {}",
            t.metrics.accuracy * 100.0,
            t.trained_at
        ),
        None => println!("Training:    -"),
    }
    println!("Runs kept:   {}", store.metrics_history().len());
    match store.last_evaluation() {
        Some(e) => println!("Evaluation:  accuracy {:.1}%", e.metrics.accuracy * 100.0),
        None => println!("Evaluation:  -"),
    }
    match store.last_backtest() {
        Some(folds) => println!("Backtest:    {} folds", folds.len()),
        None => println!("Backtest:    -"),
    }
    println!("Predictions: {}", store.predictions().len());
    Ok(())
}

fn print_metrics(m: &futebol_core::api::Metrics) {
    println!("  Accuracy:    {:.1}%", m.accuracy * 100.0);
    println!("  Log loss:    {:.3}", m.log_loss);
    println!("  Brier score: {:.3}", m.brier_score);
}

/// `2024-03-01T00:00:00.000Z` -> `2024-03-01`.
fn day(ts: &str) -> &str {
    ts.get(..10).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["futebol", "backtest", "--splits", "7", "--mock", "--json"])
            .unwrap();
        assert!(cli.mock);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Backtest { splits: 7, xgb: false }));
    }

    #[test]
    fn export_requires_a_known_kind() {
        assert!(Cli::try_parse_from(["futebol", "export", "trades"]).is_err());
        assert!(Cli::try_parse_from(["futebol", "export", "predictions", "--team", "ben"]).is_ok());
    }

    #[test]
    fn dates_parse_or_fail() {
        assert_eq!(
            parse_date(Some("2024-06-30")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30)
        );
        assert_eq!(parse_date(None).unwrap(), None);
        assert!(parse_date(Some("30/06/2024")).is_err());
    }

    #[test]
    fn day_trims_timestamps() {
        assert_eq!(day("2024-03-01T00:00:00.000Z"), "2024-03-01");
        assert_eq!(day("2024"), "2024");
    }
}
