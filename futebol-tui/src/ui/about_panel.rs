//! Panel 6: About. Methodology, metrics, responsible-use notice, key bindings.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

const METHODOLOGY: &str = "Match outcomes are predicted with machine learning trained on \
historical results. Features come from rolling windows shifted in time, so a match never \
sees its own result. Probabilities are calibrated and validated on later seasons only.";

const RESPONSIBLE_USE: &str = "For education and research only. Nothing shown here is \
financial advice or an invitation to bet. You are responsible for how you use it.";

const TECHNIQUES: [(&str, &str); 3] = [
    ("Rolling windows", "sliding time windows that mimic real forecasting conditions"),
    ("Probability calibration", "probabilities adjusted to match observed frequencies"),
    ("Temporal validation", "training always precedes testing, no look-ahead"),
];

const METRICS: [(&str, &str); 3] = [
    ("Accuracy", "share of matches where the pick was right"),
    ("Log loss", "punishes confident wrong predictions"),
    ("Brier score", "squared error of the probabilities, lower is better"),
];

const KEYS: [(&str, &str); 11] = [
    ("1-6 / Tab", "switch panel"),
    ("H", "check backend health"),
    ("e", "error history"),
    ("X", "clear saved results"),
    ("q", "quit"),
    ("Enter", "run the panel's main action"),
    ("j/k", "move the table cursor"),
    ("h/l", "focus a column, s sorts it"),
    ("[ ]", "previous / next page"),
    ("/", "search"),
    ("y", "copy the selected row"),
];

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), theme::accent_bold()))
}

fn term_lines(lines: &mut Vec<Line<'static>>, terms: &[(&'static str, &'static str)], width: usize) {
    for (term, meaning) in terms {
        lines.push(Line::from(vec![
            Span::styled(format!("  {term:<width$} "), theme::text().add_modifier(Modifier::BOLD)),
            Span::styled(*meaning, theme::secondary()),
        ]));
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(heading("Methodology"));
    lines.push(Line::from(Span::styled(METHODOLOGY, theme::text())));
    lines.push(Line::from(""));
    term_lines(&mut lines, &TECHNIQUES, 24);
    lines.push(Line::from(""));

    lines.push(heading("Metrics"));
    term_lines(&mut lines, &METRICS, 12);
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "Responsible use",
        theme::negative().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(RESPONSIBLE_USE, theme::warning())));
    lines.push(Line::from(""));

    lines.push(heading("Keys"));
    term_lines(&mut lines, &KEYS, 10);
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Version ", theme::muted()),
        Span::styled(env!("CARGO_PKG_VERSION"), theme::neutral()),
        Span::styled("   Backend ", theme::muted()),
        Span::styled(app.backend_name.clone(), theme::neutral()),
    ]));

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((app.about_scroll, 0));
    f.render_widget(para, area);
}
