use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::transcript::Transcript;
use crate::ui::theme::Theme;

/// Render the console transcript, newest line at the bottom
pub fn render(f: &mut Frame, transcript: &Transcript, theme: &Theme, area: Rect) {
    let title = if transcript.is_following() {
        "Console".to_string()
    } else {
        "Console (scrolled, End to follow)".to_string()
    };
    let block = theme.block_style(&title, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if transcript.is_empty() {
        let hint = Paragraph::new(Span::styled(
            "Waiting for activity...",
            Style::default().fg(theme.fg_muted),
        ));
        f.render_widget(hint, inner);
        return;
    }

    let lines: Vec<Line> = transcript
        .visible(inner.height as usize)
        .into_iter()
        .map(|line| console_line(line, theme))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

/// Timestamp dimmed, body colored by what the line reports
fn console_line<'a>(line: &'a str, theme: &Theme) -> Line<'a> {
    let (stamp, body) = match line.find("] ") {
        Some(idx) => line.split_at(idx + 2),
        None => ("", line),
    };
    let lower = body.to_lowercase();
    let color = if lower.contains("failed") || lower.contains("rejected") {
        theme.error
    } else if lower.contains("simulated") {
        theme.warning
    } else if lower.starts_with("new ") {
        theme.success
    } else {
        theme.fg
    };
    Line::from(vec![
        Span::styled(stamp, Style::default().fg(theme.fg_dim)),
        Span::styled(body, Style::default().fg(color)),
    ])
}
