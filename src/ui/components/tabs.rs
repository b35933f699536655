use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs as RataTabs};
use ratatui::Frame;

use crate::app::Page;
use crate::ui::theme::Theme;

const TAB_TITLES: &[(&str, &str)] = &[
    ("1", " Dashboard "),
    ("2", " Networks "),
    ("3", " Clients "),
    ("4", " Topology "),
];

/// Render the top navigation tab bar
pub fn render(f: &mut Frame, active_page: &Page, simulated: bool, theme: &Theme, area: Rect) {
    let active_idx = active_page.index();

    let titles: Vec<Line> = TAB_TITLES
        .iter()
        .enumerate()
        .map(|(i, (num, label))| {
            let style = if i == active_idx {
                theme.tab_active
            } else {
                theme.tab_inactive
            };
            Line::from(vec![
                Span::styled(*num, style.add_modifier(Modifier::BOLD)),
                Span::styled(*label, style),
            ])
        })
        .collect();

    // Titles ride the bottom border so the tab row keeps its line
    let mut block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border))
        .title_bottom(Span::styled(
            " melon ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
    if simulated {
        block = block.title_bottom(
            Line::from(Span::styled(
                " SIMULATED DATA ",
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            ))
            .right_aligned(),
        );
    }

    let tabs = RataTabs::new(titles)
        .block(block)
        .select(active_idx)
        .highlight_style(theme.tab_active)
        .divider(Span::styled(" │ ", Style::default().fg(theme.border)));

    f.render_widget(tabs, area);
}
