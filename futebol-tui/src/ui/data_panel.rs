//! Panel 2: Data. API fetch form, CSV selection, dataset info, preview table.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use futebol_core::api::MatchRecord;
use futebol_core::intake::PreviewRow;
use futebol_core::table::Column;

use crate::app::{AppState, FileSelection};
use crate::columns;
use crate::tickets::Action;
use crate::theme;
use crate::ui::{action_spans, metric_line, table};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(4)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_api_form(f, top[0], app);
    render_file(f, top[1], app);
    render_preview(f, chunks[1], app);
}

fn render_api_form(f: &mut Frame, area: Rect, app: &AppState) {
    let data = &app.data;
    let mut lines: Vec<Line> = Vec::new();

    metric_line(&mut lines, "[L] League", data.league.clone(), theme::accent());
    metric_line(&mut lines, "[S] Season", data.season.to_string(), theme::accent());
    metric_line(&mut lines, "[N] Limit", data.limit.to_string(), theme::accent());
    let token = if data.token.is_empty() {
        "(none)".to_string()
    } else {
        "•".repeat(data.token.chars().count().min(12))
    };
    metric_line(&mut lines, "[T] Token", token, theme::secondary());
    lines.push(Line::from(""));
    lines.push(Line::from(action_spans(
        "Enter",
        "Fetch from API",
        true,
        app.is_pending(Action::Fetch),
    )));

    match app.store.data_info() {
        Some(info) => lines.push(Line::from(vec![
            Span::styled("Loaded: ", theme::muted()),
            Span::styled(format!("{} rows", info.rows), theme::positive()),
            Span::styled(format!(" -> {}", info.path), theme::secondary()),
        ])),
        None => lines.push(Line::from(Span::styled("No dataset loaded yet.", theme::muted()))),
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" API ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_file(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    match &app.data.file {
        FileSelection::Empty => {
            lines.push(Line::from(Span::styled(
                "No file selected. Press o to type a path or paste one.",
                theme::muted(),
            )));
        }
        FileSelection::Checking(path) => {
            lines.push(Line::from(vec![
                Span::styled("Checking ", theme::warning()),
                Span::styled(path.display().to_string(), theme::accent()),
                Span::styled("...", theme::warning()),
            ]));
        }
        FileSelection::Valid(v) => {
            lines.push(Line::from(vec![
                Span::styled("✓ ", theme::positive()),
                Span::styled(v.file_name(), theme::accent()),
            ]));
            metric_line(&mut lines, "Rows", v.row_count.to_string(), theme::text());
            metric_line(&mut lines, "Columns", v.headers.len().to_string(), theme::text());
        }
        FileSelection::Invalid { path, message, .. } => {
            lines.push(Line::from(vec![
                Span::styled("✗ ", theme::negative()),
                Span::styled(path.display().to_string(), theme::secondary()),
            ]));
            lines.push(Line::from(Span::styled(message.as_str(), theme::negative())));
        }
    }

    lines.push(Line::from(""));
    let mut spans = action_spans(
        "u",
        "Upload & load",
        app.data.file.accepted().is_some(),
        app.is_pending(Action::Upload),
    );
    spans.extend(action_spans("c", "Clear", app.data.file.path().is_some(), false));
    lines.push(Line::from(spans));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" CSV file ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_preview(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Preview [/]search [s]ort [y]copy ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(validation) = app.data.file.validation() else {
        f.render_widget(
            Paragraph::new(Span::styled("Select a CSV file to preview it here.", theme::muted())),
            inner,
        );
        return;
    };

    if app.data.typed_preview() {
        let cols = columns::matches();
        let goals = |col: &Column<MatchRecord>, _: &MatchRecord| {
            if col.key.ends_with("_goals") {
                theme::accent()
            } else {
                Style::default()
            }
        };
        table::render(
            f,
            inner,
            &app.data.records,
            &cols,
            &app.data.preview,
            |_: &MatchRecord| true,
            &goals,
        );
    } else {
        let cols = columns::preview(&validation.headers);
        let plain = |_: &Column<PreviewRow>, _: &PreviewRow| Style::default();
        table::render(
            f,
            inner,
            &validation.preview,
            &cols,
            &app.data.preview,
            |_: &PreviewRow| true,
            &plain,
        );
    }
}
