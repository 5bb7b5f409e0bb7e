//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use devtrack_core::{DeviationPriority, DeviationStatus};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const ORANGE: Color = Color::Rgb(255, 184, 108); // #ffb86c

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

// ── Domain colors ─────────────────────────────────────────────────────

pub fn status_color(status: DeviationStatus) -> Color {
    match status {
        DeviationStatus::Open => LIGHT_BLUE,
        DeviationStatus::InProgress => ELECTRIC_YELLOW,
        DeviationStatus::UnderReview => ELECTRIC_PURPLE,
        DeviationStatus::Closed => SUCCESS_GREEN,
        DeviationStatus::Rejected => BORDER_GRAY,
    }
}

pub fn priority_color(priority: DeviationPriority) -> Color {
    match priority {
        DeviationPriority::Critical => ERROR_RED,
        DeviationPriority::High => ORANGE,
        DeviationPriority::Medium => ELECTRIC_YELLOW,
        DeviationPriority::Low => DIM_WHITE,
    }
}

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Active navigation entry.
pub fn nav_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

/// Inactive navigation entry.
pub fn nav_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Form field label.
pub fn label() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Inline validation error.
pub fn field_error() -> Style {
    Style::default().fg(ERROR_RED)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}
