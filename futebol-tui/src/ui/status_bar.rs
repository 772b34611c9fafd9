//! Bottom status bar: panel hints, backend mode, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Panel, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    for panel in Panel::ALL {
        let style = if panel == app.active_panel {
            theme::accent_bold()
        } else {
            theme::muted()
        };
        spans.push(Span::styled(
            format!(" {}:{}", panel.index() + 1, panel.label()),
            style,
        ));
    }

    spans.push(Span::raw(" | "));
    spans.push(Span::styled(format!("[{}]", app.backend_name), theme::neutral()));
    if app.requests.any_pending() {
        spans.push(Span::styled(" ⟳", theme::warning()));
    }
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    } else {
        spans.push(Span::styled("e:errors H:health X:reset q:quit", theme::muted()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
