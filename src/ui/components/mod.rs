pub mod attack_modal;
pub mod confirm_dialog;
pub mod console;
pub mod input_dialog;
pub mod status_bar;
pub mod tabs;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Centered rectangle of given percentage width and fixed height
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
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
