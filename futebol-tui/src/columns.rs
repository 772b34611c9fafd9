//! Column sets for every table the panels draw.

use futebol_core::api::{BacktestFold, MatchRecord, PredictionRow};
use futebol_core::intake::PreviewRow;
use futebol_core::table::Column;

/// Team search on the predictions panel looks at both sides of the fixture.
pub const TEAM_SEARCH_KEYS: [&str; 2] = ["home_team", "away_team"];

fn pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// `2024-03-01T00:00:00.000Z` -> `2024-03-01`; anything shorter passes through.
fn day(ts: &str) -> String {
    ts.get(..10).unwrap_or(ts).to_string()
}

pub fn backtest() -> Vec<Column<BacktestFold>> {
    vec![
        Column::new("fold", "Fold").sortable(),
        Column::new("train_end", "Train End").render_with(|f: &BacktestFold| day(&f.train_end)),
        Column::new("test_start", "Test Start").render_with(|f: &BacktestFold| day(&f.test_start)),
        Column::new("test_end", "Test End").render_with(|f: &BacktestFold| day(&f.test_end)),
        Column::new("accuracy", "Accuracy")
            .sortable()
            .render_with(|f: &BacktestFold| pct(f.metrics.accuracy)),
        Column::new("log_loss", "Log Loss")
            .sortable()
            .render_with(|f: &BacktestFold| format!("{:.3}", f.metrics.log_loss)),
        Column::new("brier_score", "Brier")
            .sortable()
            .render_with(|f: &BacktestFold| format!("{:.3}", f.metrics.brier_score)),
    ]
}

pub fn predictions() -> Vec<Column<PredictionRow>> {
    vec![
        Column::new("date", "Date").sortable(),
        Column::new("league", "League").sortable(),
        Column::new("home_team", "Home").sortable(),
        Column::new("away_team", "Away").sortable(),
        Column::new("prob_home", "P(H)")
            .sortable()
            .render_with(|r: &PredictionRow| pct(r.prob_home)),
        Column::new("prob_draw", "P(D)")
            .sortable()
            .render_with(|r: &PredictionRow| pct(r.prob_draw)),
        Column::new("prob_away", "P(A)")
            .sortable()
            .render_with(|r: &PredictionRow| pct(r.prob_away)),
        Column::new("pred_class", "Pick").sortable(),
    ]
}

pub fn matches() -> Vec<Column<MatchRecord>> {
    vec![
        Column::new("date", "Date").sortable(),
        Column::new("league", "League").sortable(),
        Column::new("season", "Season").sortable(),
        Column::new("home_team", "Home").sortable(),
        Column::new("away_team", "Away").sortable(),
        Column::new("home_goals", "HG").sortable(),
        Column::new("away_goals", "AG").sortable(),
    ]
}

/// One column per CSV header, for files that are not match records.
pub fn preview(headers: &[String]) -> Vec<Column<PreviewRow>> {
    headers
        .iter()
        .map(|h| Column::new(h.as_str(), h.as_str()).sortable())
        .collect()
}
