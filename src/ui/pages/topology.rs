use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Line};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::backend::Encryption;
use crate::topology::{self, NodeKind};

/// Canvas units per terminal column/row; rows are roughly twice as tall
const UNITS_X: f64 = 4.0;
const UNITS_Y: f64 = 8.0;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let block = theme.block_style("Topology", true);
    let inner = block.inner(chunks[0]);

    let networks = app.session.networks();
    let clients = app.session.clients();
    if networks.is_empty() && clients.is_empty() {
        let p = Paragraph::new("Nothing to draw yet. Start a scan to map the airspace.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.fg_dim))
            .block(block);
        f.render_widget(p, chunks[0]);
        render_legend(f, app, chunks[1]);
        return;
    }

    let width = f64::from(inner.width.max(1)) * UNITS_X;
    let height = f64::from(inner.height.max(1)) * UNITS_Y;
    let topo = topology::layout(width, height, networks, clients);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            // Canvas y grows upwards
            for link in &topo.links {
                let (a, b) = (&topo.nodes[link.from], &topo.nodes[link.to]);
                ctx.draw(&Line {
                    x1: a.x,
                    y1: height - a.y,
                    x2: b.x,
                    y2: height - b.y,
                    color: theme.signal_color(link.strength),
                });
            }
            ctx.layer();
            for node in &topo.nodes {
                let color = node_color(app, node.kind);
                ctx.draw(&Circle {
                    x: node.x,
                    y: height - node.y,
                    radius: node.radius,
                    color,
                });
            }
            ctx.layer();
            for node in &topo.nodes {
                if node.kind == NodeKind::Client {
                    continue;
                }
                let x = node.x - node.radius;
                let y = height - node.y - node.radius - UNITS_Y;
                ctx.print(
                    x.max(0.0),
                    y.max(0.0),
                    TextLine::from(Span::styled(node.label.clone(), Style::default().fg(theme.fg))),
                );
            }
        });

    f.render_widget(canvas, chunks[0]);
    render_legend(f, app, chunks[1]);
}

fn node_color(app: &App, kind: NodeKind) -> Color {
    match kind {
        NodeKind::AccessPoint(enc) => app.theme.encryption_color(enc),
        NodeKind::Client => app.theme.accent,
        NodeKind::Unassociated => app.theme.fg_muted,
    }
}

fn render_legend(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans: Vec<Span> = Encryption::all()
        .iter()
        .flat_map(|enc| {
            [
                Span::styled(" ● ", Style::default().fg(theme.encryption_color(*enc))),
                Span::styled(enc.to_string(), Style::default().fg(theme.fg_dim)),
            ]
        })
        .collect();
    spans.extend([
        Span::styled("  ● ", Style::default().fg(theme.accent)),
        Span::styled("client", Style::default().fg(theme.fg_dim)),
        Span::styled("  ● ", Style::default().fg(theme.fg_muted)),
        Span::styled("unassociated", Style::default().fg(theme.fg_dim)),
    ]);
    f.render_widget(Paragraph::new(TextLine::from(spans)), area);
}
