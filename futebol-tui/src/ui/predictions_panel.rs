//! Panel 5: Predictions. Fixtures file, league and team filters, the 1X2 table.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use futebol_core::api::{DEFAULT_FIXTURES_PATH, PredictionRow};
use futebol_core::table::Column;

use crate::app::{AppState, FileSelection};
use crate::columns;
use crate::tickets::Action;
use crate::theme;
use crate::ui::{action_spans, metric_line, table};

/// Shown instead of the table until a prediction run succeeds.
pub const NO_PREDICTIONS: &str = "No predictions yet. Press Enter to generate.";

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    render_form(f, chunks[0], app);

    if app.store.predictions().is_empty() {
        let msg = if app.is_pending(Action::Predict) {
            Span::styled("Generating predictions...", theme::warning())
        } else {
            Span::styled(NO_PREDICTIONS, theme::muted())
        };
        f.render_widget(Paragraph::new(msg), chunks[1]);
        return;
    }

    let cols = columns::predictions();
    let league = app.predictions.league.as_deref();
    table::render(
        f,
        chunks[1],
        app.store.predictions(),
        &cols,
        &app.predictions.table,
        |row: &PredictionRow| league.map_or(true, |l| row.league == l),
        &cell_style,
    );
}

fn cell_style(col: &Column<PredictionRow>, row: &PredictionRow) -> Style {
    match col.key.as_str() {
        "prob_home" => theme::probability(row.prob_home),
        "prob_draw" => theme::probability(row.prob_draw),
        "prob_away" => theme::probability(row.prob_away),
        "pred_class" => theme::pred_class(row.pred_class),
        _ => Style::default(),
    }
}

fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let preds = &app.predictions;
    let mut lines: Vec<Line> = Vec::new();

    let (fixtures, style) = match &preds.file {
        FileSelection::Empty => (format!("{DEFAULT_FIXTURES_PATH} (default)"), theme::secondary()),
        FileSelection::Checking(path) => (format!("checking {}...", path.display()), theme::warning()),
        FileSelection::Valid(v) => (format!("✓ {} ({} rows)", v.file_name(), v.row_count), theme::positive()),
        FileSelection::Invalid { message, .. } => (format!("✗ {message}"), theme::negative()),
    };
    metric_line(&mut lines, "[o] Fixtures", fixtures, style);

    let league = preds.league.clone().unwrap_or_else(|| "All".to_string());
    metric_line(&mut lines, "[g] League", league, theme::accent());

    let query = preds.table.query();
    let (search, style) = if query.is_empty() {
        ("(none)".to_string(), theme::muted())
    } else {
        (format!("\"{query}\""), theme::warning())
    };
    metric_line(&mut lines, "[/] Team", search, style);
    lines.push(Line::from(""));

    let mut spans = action_spans("Enter", "Generate", true, app.is_pending(Action::Predict));
    spans.extend(action_spans("x", "Export CSV", app.can_export_predictions(), false));
    spans.extend(action_spans("c", "Clear file", preds.file.path().is_some(), false));
    lines.push(Line::from(spans));

    f.render_widget(Paragraph::new(lines), area);
}
