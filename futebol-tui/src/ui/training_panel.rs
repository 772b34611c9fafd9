//! Panel 3: Training. Cutoff and model options, train/evaluate, metrics and
//! confusion matrix.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use futebol_core::api::{EvaluateResponse, Metrics, PredClass};

use crate::app::AppState;
use crate::tickets::Action;
use crate::theme;
use crate::ui::{action_spans, metric_line};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(area);

    render_form(f, chunks[0], app);

    let results = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_training(f, results[0], app);
    render_evaluation(f, results[1], app);
}

fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let training = &app.training;
    let mut lines: Vec<Line> = Vec::new();

    let cutoff = training
        .cutoff
        .map(|d| d.to_string())
        .unwrap_or_else(|| "all data".to_string());
    metric_line(&mut lines, "[D] Cutoff", cutoff, theme::accent());
    let (xgb, style) = if training.use_xgb {
        ("Enabled", theme::positive())
    } else {
        ("Disabled", theme::muted())
    };
    metric_line(&mut lines, "[t] XGBoost", xgb, style);
    lines.push(Line::from(""));

    let mut spans = action_spans("Enter", "Train", true, app.is_pending(Action::Train));
    spans.extend(action_spans("v", "Evaluate", true, app.is_pending(Action::Evaluate)));
    spans.extend(action_spans("r", "Report", app.store.last_evaluation().is_some(), false));
    lines.push(Line::from(spans));

    f.render_widget(Paragraph::new(lines), area);
}

fn metric_lines(lines: &mut Vec<Line<'_>>, metrics: &Metrics) {
    metric_line(
        lines,
        "Accuracy",
        format!("{:.1}%", metrics.accuracy * 100.0),
        theme::accuracy(metrics.accuracy),
    );
    metric_line(lines, "Log loss", format!("{:.3}", metrics.log_loss), theme::text());
    metric_line(lines, "Brier score", format!("{:.3}", metrics.brier_score), theme::text());
}

fn render_training(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();
    match app.store.last_training() {
        Some(t) => {
            metric_lines(&mut lines, &t.metrics);
            metric_line(&mut lines, "Cutoff", t.cutoff.to_string(), theme::secondary());
            metric_line(
                &mut lines,
                "Trained at",
                t.trained_at.format("%Y-%m-%d %H:%M").to_string(),
                theme::secondary(),
            );
        }
        None => lines.push(Line::from(Span::styled(
            "No model trained yet. Press Enter to train.",
            theme::muted(),
        ))),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Last training ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_evaluation(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Evaluation ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(eval) = app.store.last_evaluation() else {
        f.render_widget(
            Paragraph::new(Span::styled("No evaluation yet. Press v.", theme::muted())),
            inner,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4)])
        .split(inner);

    let mut lines: Vec<Line> = Vec::new();
    metric_lines(&mut lines, &eval.metrics);
    f.render_widget(Paragraph::new(lines), chunks[0]);
    f.render_widget(confusion_table(eval), chunks[1]);
}

/// Actual outcomes down, predicted across; the diagonal is highlighted.
fn confusion_table(eval: &EvaluateResponse) -> Table<'static> {
    let mut header = vec![Cell::from("actual \\ pred").style(theme::muted())];
    header.extend(
        PredClass::ALL
            .iter()
            .map(|c| Cell::from(c.code()).style(theme::accent_bold())),
    );

    let rows = PredClass::ALL.iter().enumerate().map(|(i, class)| {
        let mut cells = vec![Cell::from(class.code()).style(theme::accent_bold())];
        for j in 0..PredClass::ALL.len() {
            let value = eval
                .confusion_matrix
                .get(i)
                .and_then(|r| r.get(j))
                .copied()
                .unwrap_or(0);
            let style = if i == j { theme::positive() } else { theme::text() };
            cells.push(Cell::from(value.to_string()).style(style));
        }
        Row::new(cells)
    });

    let widths = [
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ];
    Table::new(rows.collect::<Vec<_>>(), widths)
        .header(Row::new(header))
        .column_spacing(1)
}
