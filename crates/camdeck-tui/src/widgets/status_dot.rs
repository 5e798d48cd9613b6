//! Stream status indicator — ●/○/? with color mapping.
//!
//! `None` means the health snapshot has no entry for the stream (or the
//! gateway itself is unreachable): rendered as unknown, never as offline.

use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

/// Returns a styled `Span` with the appropriate status dot and color.
pub fn status_span(online: Option<bool>) -> Span<'static> {
    let (symbol, color) = match online {
        Some(true) => ("●", theme::OK_GREEN),
        Some(false) => ("○", theme::ALERT_RED),
        None => ("?", theme::FAINT_TEXT),
    };
    Span::styled(symbol, Style::default().fg(color))
}

/// Human label for a status.
pub fn status_label(online: Option<bool>) -> &'static str {
    match online {
        Some(true) => "online",
        Some(false) => "offline",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cover_all_states() {
        assert_eq!(status_label(Some(true)), "online");
        assert_eq!(status_label(Some(false)), "offline");
        assert_eq!(status_label(None), "unknown");
    }

    #[test]
    fn unknown_is_not_offline() {
        assert_ne!(status_span(None).content, status_span(Some(false)).content);
    }
}
