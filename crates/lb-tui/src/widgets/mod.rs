pub mod alert;
pub mod form;
pub mod help_modal;
pub mod status_bar;
pub mod toast;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a centered rectangle of the given percentage of the parent.
pub fn centered_rect(percent_x: u16, percent_y: u16, parent: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(parent);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Centered rectangle with a fixed height in rows.
pub fn centered_fixed(percent_x: u16, height: u16, parent: Rect) -> Rect {
    let height = height.min(parent.height);
    let y = parent.y + parent.height.saturating_sub(height) / 2;
    let column = centered_rect(percent_x, 100, parent);
    Rect::new(column.x, y, column.width, height)
}
