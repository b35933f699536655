use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::animation::spinner::pulse_frame;
use crate::app::{App, Mode, Page};
use crate::backend::FeedStatus;
use crate::ui::theme::Theme;

/// Render the bottom status bar with contextual keybindings and feed state
pub fn render(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    if app.show_help_bar {
        let key_spans: Vec<Span> = keybindings(app)
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {} ", key), theme.help_key),
                    Span::styled(format!("{} ", desc), theme.help_desc),
                    Span::styled("│", Style::default().fg(theme.border)),
                ]
            })
            .collect();
        let keys = Paragraph::new(Line::from(key_spans)).style(theme.status_bar);
        f.render_widget(keys, chunks[0]);
    }

    let feed = match &app.feed_status {
        FeedStatus::Live => Span::styled(
            format!(" {} live ", pulse_frame(app.animation.tick_count)),
            Style::default().fg(theme.success),
        ),
        FeedStatus::Simulated => {
            Span::styled(" ● SIMULATED ", Style::default().fg(theme.warning))
        }
        FeedStatus::Connecting => {
            Span::styled(" … connecting ", Style::default().fg(theme.fg_dim))
        }
        FeedStatus::Failed(_) => {
            Span::styled(" ✗ feed failed ", Style::default().fg(theme.error))
        }
        FeedStatus::Idle => Span::styled(" ○ idle ", Style::default().fg(theme.fg_dim)),
    };

    let iface = Span::styled(
        format!(" {} ", app.selected_interface.as_deref().unwrap_or("no interface")),
        Style::default().fg(theme.accent),
    );
    let counts = Span::styled(
        format!(
            " {} APs · {} clients ",
            app.session.networks().len(),
            app.session.clients().len()
        ),
        Style::default().fg(theme.fg_dim),
    );

    let status_line = Line::from(vec![counts, Span::raw("│"), iface, Span::raw("│"), feed]);
    let status = Paragraph::new(status_line)
        .style(theme.status_bar)
        .alignment(Alignment::Right);
    f.render_widget(status, chunks[1]);
}

fn keybindings(app: &App) -> Vec<(&'static str, &'static str)> {
    match app.mode {
        Mode::Normal => {
            let mut keys = vec![("q", "Quit"), ("Tab", "Next"), ("1-4", "Page")];
            let scan = if app.scanning || app.scan_pending {
                ("x", "Stop scan")
            } else {
                ("s", "Scan")
            };
            keys.push(scan);
            match app.active_page {
                Page::Dashboard => keys.extend([
                    ("↑↓", "Interface"),
                    ("Enter", "Select"),
                    ("m", "Monitor"),
                    ("PgUp/PgDn", "Console"),
                ]),
                Page::Networks | Page::Clients => {
                    keys.extend([("↑↓", "Select"), ("Enter", "Attack"), ("/", "Filter")])
                }
                Page::Topology => keys.push(("r", "Refresh")),
            }
            keys
        }
        Mode::Attack if app.attack.is_attacking() => vec![("Esc/s", "Stop")],
        Mode::Attack => vec![
            ("←→", "Packets"),
            ("Space", "All clients"),
            ("c", "Client MAC"),
            ("Enter", "Launch"),
            ("Esc", "Close"),
        ],
        Mode::Input => vec![("Enter", "Submit"), ("Esc", "Cancel")],
        Mode::Dialog => vec![("y", "Yes"), ("n/Esc", "No")],
        Mode::Filtering => vec![("Enter", "Apply"), ("Esc", "Clear")],
    }
}
