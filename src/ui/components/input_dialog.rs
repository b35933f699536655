use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::attack::normalize_mac;
use crate::ui::theme::Theme;

/// Single-line text entry with cursor editing. Used for the client MAC.
#[derive(Debug, Clone)]
pub struct InputDialog {
    pub title: String,
    pub prompt: String,
    pub input: String,
    /// Cursor position in characters
    pub cursor_pos: usize,
    pub visible: bool,
}

impl InputDialog {
    pub fn new(title: &str, prompt: &str) -> Self {
        Self {
            title: title.to_string(),
            prompt: prompt.to_string(),
            input: String::new(),
            cursor_pos: 0,
            visible: false,
        }
    }

    pub fn show(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.input.clear();
        self.cursor_pos = 0;
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.input.insert(idx, c);
        self.cursor_pos += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }

    pub fn value(&self) -> &str {
        &self.input
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
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(theme.dialog_border);

        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        f.render_widget(
            Paragraph::new(Line::from(Span::styled(&self.prompt, theme.input_inactive))),
            chunks[0],
        );

        // Green once the text parses as a MAC
        let input_style = if normalize_mac(&self.input).is_some() {
            theme.input_active.fg(theme.success)
        } else {
            theme.input_active
        };
        let input_line = Line::from(vec![
            Span::styled("❯ ", Style::default().fg(theme.accent)),
            Span::styled(self.input.as_str(), input_style),
        ]);
        f.render_widget(Paragraph::new(input_line), chunks[1]);

        let cursor_x = chunks[1].x + 2 + self.cursor_pos as u16;
        f.set_cursor_position((cursor_x, chunks[1].y));

        let hint = Paragraph::new(Line::from(Span::styled(
            "Enter to submit │ Esc to cancel",
            Style::default().fg(theme.fg_muted),
        )))
        .alignment(Alignment::Center);
        f.render_widget(hint, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_editing() {
        let mut dialog = InputDialog::new("Target client", "MAC:");
        dialog.show();
        for c in "AABB".chars() {
            dialog.insert_char(c);
        }
        dialog.move_left();
        dialog.move_left();
        dialog.insert_char(':');
        assert_eq!(dialog.value(), "AA:BB");
        dialog.move_start();
        dialog.delete_forward();
        assert_eq!(dialog.value(), "A:BB");
        dialog.move_end();
        dialog.delete_char();
        assert_eq!(dialog.value(), "A:B");
        dialog.hide();
        assert!(dialog.value().is_empty());
    }
}
