//! Panel 4: Backtest. Split settings, run/export, per-fold chart and table.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{BarChart, Block, Borders, Paragraph};
use ratatui::Frame;

use futebol_core::api::{BacktestFold, MAX_SPLITS, MIN_SPLITS};
use futebol_core::table::Column;

use crate::app::AppState;
use crate::columns;
use crate::tickets::Action;
use crate::theme;
use crate::ui::{action_spans, metric_line, table};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(9), Constraint::Min(5)])
        .split(area);

    render_form(f, chunks[0], app);

    let Some(folds) = app.store.last_backtest().filter(|f| !f.is_empty()) else {
        let msg = if app.is_pending(Action::Backtest) {
            Span::styled("Backtest running...", theme::warning())
        } else {
            Span::styled("No backtest yet. Press Enter to run one.", theme::muted())
        };
        f.render_widget(Paragraph::new(msg), chunks[1]);
        return;
    };

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[1]);
    render_summary(f, middle[0], folds);
    render_chart(f, middle[1], folds);

    let cols = columns::backtest();
    let accuracy = |col: &Column<BacktestFold>, fold: &BacktestFold| {
        if col.key == "accuracy" {
            theme::accuracy(fold.metrics.accuracy)
        } else {
            Style::default()
        }
    };
    table::render(
        f,
        chunks[2],
        folds,
        &cols,
        &app.backtest.table,
        |_: &BacktestFold| true,
        &accuracy,
    );
}

fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let bt = &app.backtest;
    let running = app.is_pending(Action::Backtest);
    let mut lines: Vec<Line> = Vec::new();

    metric_line(
        &mut lines,
        "[+/-] Splits",
        format!("{} ({MIN_SPLITS}-{MAX_SPLITS})", bt.splits),
        if running { theme::muted() } else { theme::accent() },
    );
    let (xgb, style) = if bt.use_xgb {
        ("Enabled", theme::positive())
    } else {
        ("Disabled", theme::muted())
    };
    metric_line(&mut lines, "[t] XGBoost", xgb, style);
    lines.push(Line::from(""));

    let mut spans = action_spans("Enter", "Run backtest", true, running);
    spans.extend(action_spans("x", "Export CSV", app.can_export_backtest(), false));
    lines.push(Line::from(spans));

    f.render_widget(Paragraph::new(lines), area);
}

fn mean(folds: &[BacktestFold], metric: impl Fn(&BacktestFold) -> f64) -> f64 {
    folds.iter().map(metric).sum::<f64>() / folds.len() as f64
}

fn render_summary(f: &mut Frame, area: Rect, folds: &[BacktestFold]) {
    let accuracy = mean(folds, |fold| fold.metrics.accuracy);
    let mut lines: Vec<Line> = Vec::new();
    metric_line(&mut lines, "Folds", folds.len().to_string(), theme::text());
    metric_line(
        &mut lines,
        "Mean accuracy",
        format!("{:.1}%", accuracy * 100.0),
        theme::accuracy(accuracy),
    );
    metric_line(
        &mut lines,
        "Mean log loss",
        format!("{:.3}", mean(folds, |fold| fold.metrics.log_loss)),
        theme::text(),
    );
    metric_line(
        &mut lines,
        "Mean Brier",
        format!("{:.3}", mean(folds, |fold| fold.metrics.brier_score)),
        theme::text(),
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Summary ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chart(f: &mut Frame, area: Rect, folds: &[BacktestFold]) {
    let labels: Vec<String> = folds.iter().map(|fold| format!("F{}", fold.fold)).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(folds)
        .map(|(label, fold)| {
            let pct = (fold.metrics.accuracy * 100.0).round().max(0.0) as u64;
            (label.as_str(), pct)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(" Accuracy per fold (%) "),
        )
        .data(data.as_slice())
        .max(100)
        .bar_width(4)
        .bar_gap(1)
        .bar_style(theme::accent())
        .value_style(theme::accent_bold().bg(theme::ACCENT).fg(theme::BACKGROUND));
    f.render_widget(chart, area);
}
