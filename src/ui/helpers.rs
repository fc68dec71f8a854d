use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for the loading and empty-state panels.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Footer line of `[key] Label` pairs.
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (idx, (key, label)) in hints.iter().enumerate() {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        let sep = if idx + 1 == hints.len() { "" } else { "   " };
        spans.push(Span::raw(format!(" {label}{sep}")));
    }
    Line::from(spans)
}

/// First visible row after making `row` visible in a window of `height` rows
/// currently starting at `offset`.
pub(crate) fn scroll_into_view(row: usize, offset: usize, height: usize) -> usize {
    let height = height.max(1);
    if row < offset {
        row
    } else if row >= offset + height {
        row + 1 - height
    } else {
        offset
    }
}

/// Spinner frame for the loading indicator, advanced once per UI tick.
pub(crate) fn spinner_frame(tick: usize) -> &'static str {
    const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
    FRAMES[tick % FRAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_moves_only_when_needed() {
        assert_eq!(scroll_into_view(5, 0, 10), 0);
        assert_eq!(scroll_into_view(12, 0, 10), 3);
        assert_eq!(scroll_into_view(2, 4, 10), 2);
        assert_eq!(scroll_into_view(7, 3, 0), 7);
    }

    #[test]
    fn surfaces_innermost_cause() {
        let err = anyhow::anyhow!("disk on fire").context("failed to copy");
        assert_eq!(surface_error(&err), "disk on fire");
    }

    #[test]
    fn hints_alternate_keys_and_labels() {
        let line = key_hints(&[("q", "Quit"), ("r", "Random")]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "[q] Quit   [r] Random");
    }
}
