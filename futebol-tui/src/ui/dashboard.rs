//! Panel 1: Dashboard. Backend health, latest results at a glance, quick actions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline};
use ratatui::Frame;

use futebol_core::api::TrainResponse;

use crate::app::{AppState, HealthState};
use crate::tickets::Action;
use crate::theme;
use crate::ui::{action_spans, metric_line};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(10), Constraint::Length(2)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_status(f, columns[0], app);
    render_results(f, columns[1], app);
    let trends = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_metrics_history(f, trends[0], app);
    render_backtest_trend(f, trends[1], app);
    render_actions(f, chunks[2], app);
}

fn render_status(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    let (health, style) = match &app.health {
        HealthState::Unknown if app.is_pending(Action::Health) => {
            ("checking...".to_string(), theme::warning())
        }
        HealthState::Unknown => ("unknown".to_string(), theme::muted()),
        HealthState::Up { time } => (format!("online ({time})"), theme::positive()),
        HealthState::Down(_) => ("offline".to_string(), theme::negative()),
    };
    metric_line(&mut lines, "Backend", app.backend_name.clone(), theme::neutral());
    metric_line(&mut lines, "Health", health, style);
    lines.push(Line::from(""));

    match app.store.data_info() {
        Some(info) => {
            metric_line(&mut lines, "Dataset rows", info.rows.to_string(), theme::text());
            metric_line(&mut lines, "Dataset file", info.path.clone(), theme::secondary());
            metric_line(
                &mut lines,
                "Updated",
                info.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                theme::secondary(),
            );
        }
        None => lines.push(Line::from(Span::styled(
            "No dataset loaded. Press 2 to fetch or upload data.",
            theme::muted(),
        ))),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Status ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_results(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    match app.store.last_training() {
        Some(t) => {
            metric_line(
                &mut lines,
                "Accuracy",
                format!("{:.1}%", t.metrics.accuracy * 100.0),
                theme::accuracy(t.metrics.accuracy),
            );
            metric_line(&mut lines, "Log loss", format!("{:.3}", t.metrics.log_loss), theme::text());
            metric_line(
                &mut lines,
                "Brier score",
                format!("{:.3}", t.metrics.brier_score),
                theme::text(),
            );
            metric_line(
                &mut lines,
                "Trained",
                t.trained_at.format("%Y-%m-%d").to_string(),
                theme::secondary(),
            );
            metric_line(&mut lines, "Cutoff", t.cutoff.to_string(), theme::secondary());
        }
        None => lines.push(Line::from(Span::styled(
            "No model trained yet. Press t to train.",
            theme::muted(),
        ))),
    }
    lines.push(Line::from(""));

    let predictions = app.store.predictions().len();
    metric_line(
        &mut lines,
        "Predictions",
        predictions.to_string(),
        if predictions > 0 { theme::accent() } else { theme::muted() },
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Model ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_metrics_history(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Metrics history ");

    let history = app.store.metrics_history();
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        let empty = Paragraph::new(Span::styled("No training runs yet.", theme::muted()))
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let accuracy = series(history, |t| t.metrics.accuracy);
    let log_loss = series(history, |t| t.metrics.log_loss);
    let brier = series(history, |t| t.metrics.brier_score);

    // Accuracy and Brier live in [0, 1]; log loss may exceed it.
    let y_max = log_loss
        .iter()
        .map(|&(_, y)| y)
        .fold(1.0_f64, f64::max)
        * 1.05;
    let x_max = history.len().saturating_sub(1) as f64;

    let datasets = vec![
        line("Accuracy", theme::POSITIVE, &accuracy),
        line("Log loss", theme::WARNING, &log_loss),
        line("Brier", theme::NEUTRAL, &brier),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 1)))
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first.trained_at.format("%m-%d").to_string(), theme::muted()),
                    Span::styled(last.trained_at.format("%m-%d").to_string(), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::styled("0", theme::muted()),
                    Span::styled(format!("{y_max:.1}"), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}

fn series(history: &[TrainResponse], metric: impl Fn(&TrainResponse) -> f64) -> Vec<(f64, f64)> {
    history
        .iter()
        .enumerate()
        .map(|(i, run)| (i as f64, metric(run)))
        .collect()
}

fn line<'a>(name: &'a str, color: Color, data: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(color))
        .graph_type(GraphType::Line)
        .data(data)
}

fn render_backtest_trend(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Backtest accuracy ");

    let Some(folds) = app.store.last_backtest().filter(|f| !f.is_empty()) else {
        let empty = Paragraph::new(Span::styled("No backtest yet. Press b to run one.", theme::muted()))
            .block(block);
        f.render_widget(empty, area);
        return;
    };

    let data: Vec<u64> = folds
        .iter()
        .map(|fold| (fold.metrics.accuracy * 100.0).round().max(0.0) as u64)
        .collect();
    let sparkline = Sparkline::default()
        .block(block)
        .data(&data)
        .max(100)
        .style(theme::accent());
    f.render_widget(sparkline, area);
}

fn render_actions(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = Vec::new();
    spans.extend(action_spans("f", "Fetch data", true, app.is_pending(Action::Fetch)));
    spans.extend(action_spans("t", "Train", true, app.is_pending(Action::Train)));
    spans.extend(action_spans("v", "Evaluate", true, app.is_pending(Action::Evaluate)));
    spans.extend(action_spans("b", "Backtest", true, app.is_pending(Action::Backtest)));
    spans.extend(action_spans("p", "Predict", true, app.is_pending(Action::Predict)));

    let lines = vec![
        Line::from(Span::styled("Quick actions", theme::secondary())),
        Line::from(spans),
    ];
    f.render_widget(Paragraph::new(lines), area);
}
