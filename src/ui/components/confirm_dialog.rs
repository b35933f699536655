use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::centered_rect;
use crate::ui::theme::Theme;

/// A Yes/No confirmation dialog with an optional warning line
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub warning: Option<String>,
    pub visible: bool,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: &str, message: &str, warning: Option<String>) {
        self.title = title.to_string();
        self.message = message.to_string();
        self.warning = warning;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.warning = None;
    }

    pub fn render(&self, f: &mut Frame, theme: &Theme) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 7, f.area());
        f.render_widget(Clear, area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning));

        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2), Constraint::Length(1)])
            .split(inner);

        let msg = Paragraph::new(Line::from(Span::styled(
            &self.message,
            Style::default().fg(theme.fg),
        )))
        .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(msg, chunks[0]);

        if let Some(ref warning) = self.warning {
            let warn = Paragraph::new(Line::from(Span::styled(
                format!("⚠ {warning}"),
                Style::default()
                    .fg(theme.error)
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            f.render_widget(warn, chunks[1]);
        }

        let actions = Line::from(vec![
            Span::styled(" y ", theme.help_key),
            Span::styled("Yes ", Style::default().fg(theme.fg_dim)),
            Span::styled("│", Style::default().fg(theme.border)),
            Span::styled(" n ", theme.help_key),
            Span::styled("No ", Style::default().fg(theme.fg_dim)),
        ]);
        f.render_widget(
            Paragraph::new(actions).alignment(Alignment::Center),
            chunks[2],
        );
    }
}
