use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use super::filter_line;
use crate::app::App;
use crate::ui::theme::{hidden_icon, lock_icon, signal_icon};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    filter_line(f, app, chunks[0]);

    let networks = app.filtered_networks();
    let block = theme.block_style(&format!("Networks ({})", networks.len()), true);

    if networks.is_empty() {
        let msg = if app.session.networks().is_empty() {
            if app.scanning {
                "Listening for beacons..."
            } else {
                "No networks yet. Press 's' to scan."
            }
        } else {
            "No networks match your filter."
        };
        let p = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.fg_dim))
            .block(block);
        f.render_widget(p, chunks[1]);
        return;
    }

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("SSID"),
        Cell::from("BSSID"),
        Cell::from("Ch"),
        Cell::from("Signal"),
        Cell::from("Security"),
        Cell::from("Vendor"),
        Cell::from("Clients"),
        Cell::from("Last seen"),
    ])
    .style(theme.table_header)
    .height(1);

    let rows: Vec<Row> = networks
        .iter()
        .map(|net| {
            let enc_color = theme.encryption_color(net.encryption);
            let icon = if net.is_hidden() {
                hidden_icon(app.nerd_fonts)
            } else {
                lock_icon(!net.encryption.is_open(), app.nerd_fonts)
            };
            let ssid_style = if net.is_hidden() {
                Style::default()
                    .fg(theme.fg_dim)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default().fg(theme.fg)
            };
            Row::new(vec![
                Cell::from(Span::styled(icon, Style::default().fg(enc_color))),
                Cell::from(Span::styled(net.display_name().to_string(), ssid_style)),
                Cell::from(net.bssid.clone()),
                Cell::from(net.channel.to_string()),
                Cell::from(Span::styled(
                    format!("{} {}%", signal_icon(net.signal, app.nerd_fonts), net.signal),
                    Style::default().fg(theme.signal_color(net.signal)),
                )),
                Cell::from(Span::styled(
                    net.encryption.to_string(),
                    Style::default().fg(enc_color),
                )),
                Cell::from(net.vendor.clone()),
                Cell::from(net.clients.to_string()),
                Cell::from(Span::styled(
                    net.last_seen
                        .with_timezone(&chrono::Local)
                        .format("%H:%M:%S")
                        .to_string(),
                    Style::default().fg(theme.fg_dim),
                )),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(14),
        Constraint::Length(18),
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let mut table_state = TableState::default();
    table_state.select(Some(app.networks_state.selected_index));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme.table_row_selected);

    f.render_stateful_widget(table, chunks[1], &mut table_state);
}
