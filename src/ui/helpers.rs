use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
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

/// Build a footer line of `[key] description` pairs.
pub(crate) fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (idx, (key, description)) in hints.iter().enumerate() {
        spans.push(Span::styled(format!("[{key}]"), key_style));
        let separator = if idx + 1 == hints.len() { "" } else { "   " };
        spans.push(Span::raw(format!(" {description}{separator}")));
    }
    Line::from(spans)
}

/// Cursor position `column` cells right of and `row` lines below the top-left
/// of `area`, kept on the last cell when the text runs past the edge.
pub(crate) fn clamped_cursor(area: Rect, column: usize, row: usize) -> (u16, u16) {
    let column = u16::try_from(column).unwrap_or(u16::MAX);
    let row = u16::try_from(row).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(column)
        .min(area.right().saturating_sub(1));
    let y = area
        .y
        .saturating_add(row)
        .min(area.bottom().saturating_sub(1));
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }

    #[test]
    fn cursor_inside_area_is_unchanged() {
        let area = Rect::new(10, 5, 40, 8);
        assert_eq!(clamped_cursor(area, 12, 3), (22, 8));
    }

    #[test]
    fn cursor_past_the_edge_stays_on_last_cell() {
        let area = Rect::new(10, 5, 40, 8);
        assert_eq!(clamped_cursor(area, 500, 2), (49, 7));
        assert_eq!(clamped_cursor(area, usize::MAX, usize::MAX), (49, 12));
    }

    #[test]
    fn key_hints_pairs_keys_with_text() {
        let line = key_hints(&[("Enter", "Save"), ("Esc", "Cancel")]);
        let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "[Enter] Save   [Esc] Cancel");
    }
}
