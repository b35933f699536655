use std::collections::VecDeque;

use chrono::{DateTime, Local};

pub const DEFAULT_MAX_LINES: usize = 1000;

/// Timestamped console log shown on the dashboard
#[derive(Debug)]
pub struct Transcript {
    lines: VecDeque<String>,
    max_lines: usize,
    /// Lines scrolled up from the bottom; 0 while following
    offset: usize,
    follow: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl Transcript {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            offset: 0,
            follow: true,
        }
    }

    pub fn push(&mut self, message: impl AsRef<str>) {
        self.push_at(Local::now(), message);
    }

    pub fn push_at(&mut self, at: DateTime<Local>, message: impl AsRef<str>) {
        self.lines
            .push_back(format!("[{}] {}", at.format("%H:%M:%S"), message.as_ref()));
        if self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
        if !self.follow {
            // Keep the viewport pinned on the same lines
            self.offset = (self.offset + 1).min(self.lines.len().saturating_sub(1));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[cfg(test)]
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn scroll_up(&mut self, n: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.offset = (self.offset + n).min(max);
        self.follow = self.offset == 0;
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
        self.follow = self.offset == 0;
    }

    /// Jump to the newest line and resume auto-scroll
    pub fn follow(&mut self) {
        self.offset = 0;
        self.follow = true;
    }

    /// Lines to show in a viewport of `height` rows, oldest first
    pub fn visible(&self, height: usize) -> Vec<&str> {
        let end = self.lines.len().saturating_sub(self.offset);
        let start = end.saturating_sub(height);
        self.lines.range(start..end).map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_line_format() {
        let mut log = Transcript::default();
        log.push_at(at(9, 5, 7), "Started scanning on wlan0mon");
        assert_eq!(log.lines().next(), Some("[09:05:07] Started scanning on wlan0mon"));
    }

    #[test]
    fn test_bounded() {
        let mut log = Transcript::new(3);
        for i in 0..5 {
            log.push_at(at(0, 0, i), format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        assert!(log.lines().next().unwrap().ends_with("line 2"));
    }

    #[test]
    fn test_follow_shows_newest() {
        let mut log = Transcript::default();
        for i in 0..10 {
            log.push_at(at(0, 0, i), format!("line {i}"));
        }
        let view = log.visible(3);
        assert_eq!(view.len(), 3);
        assert!(view[2].ends_with("line 9"));
    }

    #[test]
    fn test_manual_scroll_suspends_follow() {
        let mut log = Transcript::default();
        for i in 0..10 {
            log.push_at(at(0, 0, i), format!("line {i}"));
        }
        log.scroll_up(2);
        assert!(!log.is_following());
        assert!(log.visible(1)[0].ends_with("line 7"));

        log.push_at(at(0, 1, 0), "new line");
        assert!(log.visible(1)[0].ends_with("line 7"));

        log.follow();
        assert!(log.visible(1)[0].ends_with("new line"));
        assert!(log.is_following());
    }

    #[test]
    fn test_scroll_down_to_bottom_resumes_follow() {
        let mut log = Transcript::default();
        for i in 0..4 {
            log.push_at(at(0, 0, i), format!("line {i}"));
        }
        log.scroll_up(10);
        assert!(log.visible(1)[0].ends_with("line 0"));
        log.scroll_down(10);
        assert!(log.is_following());
    }
}
