//! Neon-on-charcoal palette and the styles every panel draws with.
//!
//! # Color Palette
//! - **Accent**: electric cyan (focus, highlights, info)
//! - **Positive**: neon green (home wins, success, good metrics)
//! - **Negative**: hot pink (away wins, errors, poor metrics)
//! - **Warning**: neon orange (draws, pending, alerts)
//! - **Neutral**: cool purple (secondary info)
//! - **Muted**: steel blue (hints, disabled actions)

use ratatui::style::{Color, Modifier, Style};

use futebol_core::api::PredClass;

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

pub fn text() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn secondary() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

/// Row under the cursor.
pub fn cursor_row() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        secondary()
    }
}

/// Key hint for an action; dimmed while the action cannot run.
pub fn action(enabled: bool) -> Style {
    if enabled {
        accent()
    } else {
        muted().add_modifier(Modifier::DIM)
    }
}

/// Badge colour for a predicted outcome.
pub fn pred_class(class: PredClass) -> Style {
    let color = match class {
        PredClass::Home => POSITIVE,
        PredClass::Draw => WARNING,
        PredClass::Away => NEGATIVE,
    };
    Style::default()
        .fg(BACKGROUND)
        .bg(color)
        .add_modifier(Modifier::BOLD)
}

/// Accuracy colouring: above 60% is good, below 50% is poor.
pub fn accuracy(value: f64) -> Style {
    if value >= 0.6 {
        positive()
    } else if value >= 0.5 {
        warning()
    } else {
        negative()
    }
}

/// Probability shading for the prediction table.
pub fn probability(p: f64) -> Style {
    if p >= 0.5 {
        positive().add_modifier(Modifier::BOLD)
    } else if p >= 0.33 {
        text()
    } else {
        secondary()
    }
}
