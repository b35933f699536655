use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use super::filter_line;
use crate::app::App;
use crate::ui::theme::signal_icon;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    filter_line(f, app, chunks[0]);

    let clients = app.filtered_clients();
    let block = theme.block_style(&format!("Clients ({})", clients.len()), true);

    if clients.is_empty() {
        let msg = if app.session.clients().is_empty() {
            "No clients seen yet."
        } else {
            "No clients match your filter."
        };
        let p = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.fg_dim))
            .block(block);
        f.render_widget(p, chunks[1]);
        return;
    }

    let header = Row::new(vec![
        Cell::from("MAC"),
        Cell::from("Access point"),
        Cell::from("Power"),
        Cell::from("Rate"),
        Cell::from("Lost"),
        Cell::from("Frames"),
        Cell::from("Probes"),
        Cell::from("Vendor"),
    ])
    .style(theme.table_header)
    .height(1);

    let rows: Vec<Row> = clients
        .iter()
        .map(|client| {
            let ap = match client.associated_bssid() {
                Some(bssid) => Span::styled(
                    app.session
                        .network(bssid)
                        .map(|n| n.display_name().to_string())
                        .unwrap_or_else(|| bssid.to_string()),
                    Style::default().fg(theme.fg),
                ),
                None => Span::styled("(not associated)", Style::default().fg(theme.fg_muted)),
            };
            let probes = if client.probe.is_empty() {
                Span::styled("-", Style::default().fg(theme.fg_muted))
            } else {
                Span::styled(client.probe.join(", "), Style::default().fg(theme.accent))
            };
            Row::new(vec![
                Cell::from(client.mac.clone()),
                Cell::from(ap),
                Cell::from(Span::styled(
                    format!("{} {}", signal_icon(client.power, app.nerd_fonts), client.power),
                    Style::default().fg(theme.signal_color(client.power)),
                )),
                Cell::from(client.rate.clone()),
                Cell::from(client.lost.to_string()),
                Cell::from(client.frames.to_string()),
                Cell::from(probes),
                Cell::from(client.vendor.clone().unwrap_or_default()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Min(14),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Min(12),
        Constraint::Length(10),
    ];

    let mut table_state = TableState::default();
    table_state.select(Some(app.clients_state.selected_index));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme.table_row_selected);

    f.render_stateful_widget(table, chunks[1], &mut table_state);
}
