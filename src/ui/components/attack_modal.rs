use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Gauge, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::app::App;
use crate::attack::{AttackState, MAX_PACKETS, MIN_PACKETS};
use crate::ui::theme::attack_icon;

/// Deauthentication form drawn over the current page
pub fn render(f: &mut Frame, app: &App) {
    let Some(target) = app.attack_target.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let form = &app.attack;

    let area = centered_rect(60, 15, f.area());
    f.render_widget(Clear, area);

    let block = theme
        .block_style(&format!("{}Deauthentication", attack_icon(app.nerd_fonts)), true)
        .border_style(Style::default().fg(theme.error));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // target
            Constraint::Length(1), // packets label
            Constraint::Length(1), // packets gauge
            Constraint::Length(2), // client selection
            Constraint::Length(1), // progress
            Constraint::Length(1), // state
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(inner);

    let label = Style::default().fg(theme.fg_dim);
    let value = Style::default().fg(theme.fg).add_modifier(Modifier::BOLD);

    let seen = app.session.clients_of(&target.bssid).count();
    let target_lines = vec![
        Line::from(vec![
            Span::styled("Target AP: ", label),
            Span::styled(target.label.as_str(), value),
        ]),
        Line::from(vec![
            Span::styled("BSSID:     ", label),
            Span::styled(target.bssid.as_str(), value),
        ]),
        Line::from(vec![
            Span::styled("Seen:      ", label),
            Span::styled(format!("{seen} associated clients"), Style::default().fg(theme.fg)),
        ]),
    ];
    f.render_widget(Paragraph::new(target_lines), rows[0]);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Packets:   ", label),
            Span::styled(form.packets.to_string(), value),
            Span::styled(
                format!("  ({MIN_PACKETS}-{MAX_PACKETS})"),
                Style::default().fg(theme.fg_muted),
            ),
        ])),
        rows[1],
    );
    let ratio = f64::from(form.packets - MIN_PACKETS) / f64::from(MAX_PACKETS - MIN_PACKETS);
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme.accent))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(""),
        rows[2],
    );

    let checkbox = if form.all_clients { "[x]" } else { "[ ]" };
    let client = match (&form.client_mac, form.all_clients) {
        (_, true) => Span::styled("broadcast", Style::default().fg(theme.fg_muted)),
        (Some(mac), false) => Span::styled(mac.as_str(), value),
        (None, false) => {
            Span::styled("press c to enter a MAC", Style::default().fg(theme.warning))
        }
    };
    f.render_widget(
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(format!("{checkbox} "), Style::default().fg(theme.accent)),
                Span::styled("All clients", Style::default().fg(theme.fg)),
            ]),
            Line::from(vec![Span::styled("Client:    ", label), client]),
        ]),
        rows[3],
    );

    let progress = form.progress();
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme.error))
            .percent(u16::from(progress))
            .label(format!("{progress}%")),
        rows[4],
    );

    let state = match form.state() {
        AttackState::Idle => Span::styled("Idle", Style::default().fg(theme.fg_dim)),
        AttackState::Attacking { .. } => Span::styled(
            format!("{} Attacking...", app.animation.spinner()),
            Style::default()
                .fg(theme.error)
                .add_modifier(Modifier::BOLD),
        ),
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![Span::styled("State:     ", label), state])),
        rows[5],
    );

    let hints: &[(&str, &str)] = if form.is_attacking() {
        &[("s/Esc", "stop")]
    } else {
        &[
            ("←→", "packets"),
            ("Space", "all"),
            ("c", "MAC"),
            ("Enter", "launch"),
            ("Esc", "close"),
        ]
    };
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(k, d)| {
            [
                Span::styled(format!(" {k} "), theme.help_key),
                Span::styled(format!("{d} "), theme.help_desc),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), rows[7]);
}
