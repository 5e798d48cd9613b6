//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ACCENT_BLUE: Color = Color::Rgb(130, 170, 255); // #82aaff
pub const SOFT_CYAN: Color = Color::Rgb(137, 221, 255); // #89ddff
pub const AMBER: Color = Color::Rgb(255, 203, 107); // #ffcb6b
pub const OK_GREEN: Color = Color::Rgb(110, 230, 130); // #6ee682
pub const ALERT_RED: Color = Color::Rgb(255, 110, 110); // #ff6e6e

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_TEXT: Color = Color::Rgb(170, 178, 191); // #aab2bf
pub const FAINT_TEXT: Color = Color::Rgb(100, 110, 130); // #646e82
pub const BORDER_GRAY: Color = Color::Rgb(84, 92, 112); // #545c70
pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 46, 58); // #2a2e3a

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(SOFT_CYAN).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ACCENT_BLUE)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(SOFT_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_TEXT)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT_BLUE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_TEXT)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(FAINT_TEXT)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(SOFT_CYAN).add_modifier(Modifier::BOLD)
}

/// Form field label.
pub fn field_label() -> Style {
    Style::default().fg(DIM_TEXT)
}

/// Form field with input focus.
pub fn field_active() -> Style {
    Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}

/// Inline error text (form validation, failed mutation).
pub fn error_text() -> Style {
    Style::default().fg(ALERT_RED)
}
