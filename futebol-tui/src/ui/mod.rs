//! Top-level UI layout: six-panel frame with status bar.

pub mod about_panel;
pub mod backtest_panel;
pub mod dashboard;
pub mod data_panel;
pub mod overlays;
pub mod predictions_panel;
pub mod status_bar;
pub mod table;
pub mod training_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match &app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area, app),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::Report => overlays::render_report(f, main_area, app),
        Overlay::ConfirmReset => overlays::render_confirm_reset(f, main_area),
        Overlay::Edit { field, buffer, .. } => overlays::render_edit(f, main_area, *field, buffer),
        Overlay::None => {}
    }
}

/// Draw the active panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Dashboard => dashboard::render(f, inner, app),
        Panel::Data => data_panel::render(f, inner, app),
        Panel::Training => training_panel::render(f, inner, app),
        Panel::Backtest => backtest_panel::render(f, inner, app),
        Panel::Predictions => predictions_panel::render(f, inner, app),
        Panel::About => about_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// A right-aligned label followed by a value.
pub fn metric_line(lines: &mut Vec<Line<'_>>, label: &str, value: impl Into<String>, style: Style) {
    lines.push(Line::from(vec![
        Span::styled(format!("{label:>16}: "), theme::muted()),
        Span::styled(value.into(), style),
    ]));
}

/// `[key] label`, dimmed while the action is unavailable and suffixed
/// while its request is in flight.
pub fn action_spans(key: &str, label: &str, enabled: bool, pending: bool) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::styled(format!("[{key}] "), theme::action(enabled && !pending)),
        Span::styled(label.to_string(), theme::action(enabled && !pending)),
    ];
    if pending {
        spans.push(Span::styled(" (processing...)", theme::warning()));
    }
    spans.push(Span::raw("   "));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered_rect(60, 50, area);
        assert!(r.x >= 20 && r.right() <= 80);
        assert!(r.y >= 10 && r.bottom() <= 30);
    }

    #[test]
    fn pending_action_is_marked() {
        let spans = action_spans("Enter", "Train", true, true);
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("processing"));
    }
}
