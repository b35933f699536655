pub mod clients;
pub mod dashboard;
pub mod networks;
pub mod topology;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{App, Mode, Page};
use crate::ui::components;
use crate::ui::theme::Theme;

/// Render the full screen: tabs + active page + status bar + overlays
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tab bar
            Constraint::Min(0),    // Page content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    components::tabs::render(f, &app.active_page, app.is_simulated(), &app.theme, chunks[0]);

    match app.active_page {
        Page::Dashboard => dashboard::render(f, app, chunks[1]),
        Page::Networks => networks::render(f, app, chunks[1]),
        Page::Clients => clients::render(f, app, chunks[1]),
        Page::Topology => topology::render(f, app, chunks[1]),
    }

    components::status_bar::render(f, app, &app.theme, chunks[2]);

    // Overlays, bottom to top
    if matches!(app.mode, Mode::Attack | Mode::Input | Mode::Dialog) {
        components::attack_modal::render(f, app);
    }
    app.input_dialog.render(f, &app.theme);
    app.confirm_dialog.render(f, &app.theme);

    if let Some(ref msg) = app.toast_message {
        render_toast(f, msg, app.toast_is_error, &app.theme);
    }
}

/// One-line filter prompt above the Networks and Clients tables
pub(crate) fn filter_line(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let line = if app.mode == Mode::Filtering {
        Line::from(vec![
            Span::styled(" / ", theme.help_key),
            Span::styled(app.filter.as_str(), theme.input_active),
            Span::styled("█", Style::default().fg(theme.accent)),
        ])
    } else if !app.filter.is_empty() {
        Line::from(vec![
            Span::styled(" filter: ", Style::default().fg(theme.fg_dim)),
            Span::styled(app.filter.as_str(), Style::default().fg(theme.accent)),
        ])
    } else {
        Line::from(Span::styled(" press / to filter", Style::default().fg(theme.fg_muted)))
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Render a temporary toast notification at the top-right
fn render_toast(f: &mut Frame, message: &str, is_error: bool, theme: &Theme) {
    let area = f.area();
    let width = (unicode_width::UnicodeWidthStr::width(message) as u16 + 6)
        .min(area.width.saturating_sub(4));
    let x = area.width.saturating_sub(width + 2);
    let toast_area = Rect::new(x, 1, width, 3.min(area.height));

    f.render_widget(Clear, toast_area);

    let color = if is_error { theme.error } else { theme.success };
    let icon = if is_error { " ✗ " } else { " ✓ " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let text = Paragraph::new(Line::from(vec![
        Span::styled(icon, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(message, Style::default().fg(theme.fg)),
    ]))
    .block(block);

    f.render_widget(text, toast_area);
}
