use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::App;
use crate::backend::{FeedStatus, InterfaceMode, Outcome};
use crate::ui::components::console;
use crate::ui::theme::Theme;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // interfaces | scan + backend
            Constraint::Min(5),    // console
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(top[1]);

    render_interfaces(f, app, top[0]);
    render_scan(f, app, theme, side[0]);
    render_backend(f, app, theme, side[1]);
    console::render(f, &app.transcript, theme, rows[1]);
}

fn render_interfaces(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let title = if app.interfaces_simulated {
        "Interfaces (simulated)"
    } else {
        "Interfaces"
    };
    let block = theme.block_style(title, true);

    if app.interfaces.is_empty() {
        let p = Paragraph::new("No wireless interfaces reported. Press 'r' to refresh.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.fg_dim))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Name"),
        Cell::from("Driver"),
        Cell::from("Chipset"),
        Cell::from("Mode"),
    ])
    .style(theme.table_header)
    .height(1);

    let rows: Vec<Row> = app
        .interfaces
        .iter()
        .map(|iface| {
            let selected = app.selected_interface.as_deref() == Some(iface.name.as_str());
            let marker = if selected { "▶" } else { " " };
            let mode_color = match iface.status {
                InterfaceMode::Monitor => theme.success,
                InterfaceMode::Normal => theme.fg,
                InterfaceMode::Disconnected => theme.error,
            };
            Row::new(vec![
                Cell::from(Span::styled(marker, Style::default().fg(theme.accent))),
                Cell::from(Span::styled(
                    iface.name.clone(),
                    Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
                )),
                Cell::from(iface.driver.clone()),
                Cell::from(iface.chipset.clone()),
                Cell::from(Span::styled(iface.status.label(), Style::default().fg(mode_color))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(10),
        Constraint::Length(12),
    ];

    let mut table_state = TableState::default();
    table_state.select(Some(app.interfaces_state.selected_index));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme.table_row_selected);
    f.render_stateful_widget(table, area, &mut table_state);
}

fn render_scan(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = theme.block_style("Scan", false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let state = if app.scanning {
        Span::styled(
            format!("{} scanning", app.animation.spinner()),
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD),
        )
    } else if app.scan_pending {
        Span::styled(
            format!("{} starting", app.animation.spinner()),
            Style::default().fg(theme.warning),
        )
    } else {
        Span::styled("stopped", Style::default().fg(theme.fg_dim))
    };
    let iface = app.selected_interface.as_deref().unwrap_or("none");

    let lines = vec![
        Line::from(vec![
            state,
            Span::styled("  on ", Style::default().fg(theme.fg_dim)),
            Span::styled(iface, Style::default().fg(theme.accent)),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{} networks", app.session.networks().len()),
                Style::default().fg(theme.fg),
            ),
            Span::styled(" · ", Style::default().fg(theme.border)),
            Span::styled(
                format!("{} clients", app.session.clients().len()),
                Style::default().fg(theme.fg),
            ),
            Span::styled(" · ", Style::default().fg(theme.border)),
            Span::styled(
                format!("{} batches", app.session.batches()),
                Style::default().fg(theme.fg_dim),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_backend(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = theme.block_style("Backend", false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let label = Style::default().fg(theme.fg_dim);
    let (status, status_style) = match &app.server_status {
        None => ("unknown".to_string(), Style::default().fg(theme.fg_dim)),
        Some(Outcome::Live(s)) => (
            format!("{} · v{} · {} processes", s.status, s.version, s.active_processes),
            Style::default().fg(theme.success),
        ),
        Some(Outcome::Simulated { reason, .. }) => {
            (format!("unreachable ({reason})"), Style::default().fg(theme.warning))
        }
    };
    let feed_style = match app.feed_status {
        FeedStatus::Live => Style::default().fg(theme.success),
        FeedStatus::Simulated => Style::default().fg(theme.warning),
        FeedStatus::Failed(_) => Style::default().fg(theme.error),
        _ => Style::default().fg(theme.fg_dim),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("API:    ", label),
            Span::styled(app.api_url.as_str(), Style::default().fg(theme.fg)),
            Span::styled(format!(" [{}]", app.backend_mode.label()), label),
        ]),
        Line::from(vec![Span::styled("Server: ", label), Span::styled(status, status_style)]),
        Line::from(vec![
            Span::styled("Feed:   ", label),
            Span::styled(app.feed_status.label(), feed_style),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}
