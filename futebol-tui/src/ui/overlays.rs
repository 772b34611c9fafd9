//! Overlay widgets: welcome, error history, evaluation report, reset
//! confirmation, edit prompt.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, Field};
use crate::theme;
use crate::ui::centered_rect;

/// First-run welcome overlay.
pub fn render_welcome(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(60, 50, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Futebol 1X2 ")
        .title_style(theme::accent_bold());

    let steps = [
        "  1. Press 2 for Data: fetch from the API or upload a CSV",
        "  2. Press 3 for Training: train, then evaluate the model",
        "  3. Press 4 for Backtest: check it across time splits",
        "  4. Press 5 for Predictions: home / draw / away odds",
    ];
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled("Getting started:", theme::accent_bold())),
        Line::from(""),
    ];
    text.extend(steps.iter().map(|s| Line::from(Span::styled(*s, theme::muted()))));
    text.push(Line::from(""));
    text.push(Line::from(vec![
        Span::styled("Backend: ", theme::muted()),
        Span::styled(app.backend_name.clone(), theme::neutral()),
    ]));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Press any key to dismiss...",
        theme::neutral(),
    )));

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Classification report of the last evaluation, verbatim.
pub fn render_report(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(70, 60, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Classification Report [Esc]close ")
        .title_style(theme::accent_bold());

    let lines: Vec<Line> = match app.store.last_evaluation() {
        Some(eval) => eval
            .classification_report
            .lines()
            .map(|l| Line::from(Span::styled(l, theme::text())))
            .collect(),
        None => vec![Line::from(Span::styled("No evaluation yet.", theme::muted()))],
    };

    f.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_confirm_reset(f: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 25, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::warning())
        .title(" Reset ")
        .title_style(theme::warning());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Clear training, evaluation, backtest, predictions and dataset info?",
            theme::text(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", theme::negative()),
            Span::styled("clear everything   ", theme::muted()),
            Span::styled("[n/Esc] ", theme::accent()),
            Span::styled("keep", theme::muted()),
        ]),
    ];
    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Single-line text prompt.
pub fn render_edit(f: &mut Frame, area: Rect, field: Field, buffer: &str) {
    let popup = centered_rect(60, 20, area);
    let popup = Rect {
        height: popup.height.max(5).min(area.height),
        ..popup
    };
    f.render_widget(Clear, popup);

    let hint = if field.is_search() {
        " [Enter]keep [Esc]undo "
    } else {
        " [Enter]apply [Esc]cancel "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(format!(" {}{hint}", field.label()))
        .title_style(theme::accent_bold());

    let shown = if field == Field::Token {
        "•".repeat(buffer.chars().count())
    } else {
        buffer.to_string()
    };
    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", theme::accent()),
            Span::styled(shown, theme::accent_bold()),
            Span::styled("_", theme::accent()),
        ]),
    ];
    f.render_widget(Paragraph::new(text).block(block), popup);
}
