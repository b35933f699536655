use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

use crate::backend::Encryption;
use crate::config::{EncryptionColors, ThemeConfig};

// ─── Nerd Font Icons ──────────────────────────────────────────────────────
pub const SIGNAL_ICONS_NERD: &[&str] = &["󰤯 ", "󰤟 ", "󰤢 ", "󰤥 ", "󰤨 "];
pub const SIGNAL_ICONS_PLAIN: &[&str] = &["▂   ", "▂▄  ", "▂▄▆ ", "▂▄▆█", "▂▄▆█"];

pub const ICON_LOCK: &str = "󰌾 ";
pub const ICON_LOCK_OPEN: &str = "󰴲 ";
pub const ICON_HIDDEN: &str = "󰈈 ";
pub const ICON_BOLT: &str = "󱐋 ";

pub const PLAIN_LOCK: &str = "[L]";
pub const PLAIN_LOCK_OPEN: &str = "[O]";
pub const PLAIN_HIDDEN: &str = "[H]";
pub const PLAIN_BOLT: &str = "!";

/// Resolved colors and styles used by every widget
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_muted: Color,
    pub accent: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub encryption: EncryptionColors,

    pub table_header: Style,
    pub table_row_selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub help_key: Style,
    pub help_desc: Style,
    pub status_bar: Style,
    pub dialog_border: Style,
    pub input_active: Style,
    pub input_inactive: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl Theme {
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        Self {
            fg: cfg.fg,
            fg_dim: cfg.fg_dim,
            fg_muted: cfg.fg_dim,
            accent: cfg.accent,
            border: cfg.border,
            success: cfg.success,
            warning: cfg.warning,
            error: cfg.error,
            encryption: cfg.encryption.clone(),

            table_header: Style::default().fg(cfg.accent).add_modifier(Modifier::BOLD),
            table_row_selected: Style::default()
                .fg(cfg.fg)
                .bg(cfg.selected_bg)
                .add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(cfg.accent).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(cfg.fg_dim),
            help_key: Style::default().fg(cfg.accent).add_modifier(Modifier::BOLD),
            help_desc: Style::default().fg(cfg.fg_dim),
            status_bar: Style::default().fg(cfg.fg),
            dialog_border: Style::default().fg(cfg.accent),
            input_active: Style::default().fg(cfg.fg),
            input_inactive: Style::default().fg(cfg.fg_dim),
        }
    }

    /// Rounded bordered block with an accent title
    pub fn block_style(&self, title: &str, focused: bool) -> Block<'static> {
        let border = if focused { self.accent } else { self.border };
        Block::default()
            .title(format!(" {title} "))
            .title_style(
                Style::default()
                    .fg(self.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
    }

    pub fn encryption_color(&self, enc: Encryption) -> Color {
        match enc {
            Encryption::Wpa3 => self.encryption.wpa3,
            Encryption::Wpa2 => self.encryption.wpa2,
            Encryption::Wpa => self.encryption.wpa,
            Encryption::Wep => self.encryption.wep,
            Encryption::Open => self.encryption.open,
        }
    }

    /// Signal color by strength percentage
    pub fn signal_color(&self, strength: u8) -> Color {
        match strength {
            0..=39 => self.error,
            40..=69 => self.warning,
            _ => self.success,
        }
    }
}

/// Signal icon by strength percentage
pub fn signal_icon(strength: u8, nerd_fonts: bool) -> &'static str {
    let icons = if nerd_fonts {
        SIGNAL_ICONS_NERD
    } else {
        SIGNAL_ICONS_PLAIN
    };
    match strength {
        0..=19 => icons[0],
        20..=39 => icons[1],
        40..=59 => icons[2],
        60..=79 => icons[3],
        _ => icons[4],
    }
}

pub fn lock_icon(encrypted: bool, nerd_fonts: bool) -> &'static str {
    match (nerd_fonts, encrypted) {
        (true, true) => ICON_LOCK,
        (true, false) => ICON_LOCK_OPEN,
        (false, true) => PLAIN_LOCK,
        (false, false) => PLAIN_LOCK_OPEN,
    }
}

pub fn hidden_icon(nerd_fonts: bool) -> &'static str {
    if nerd_fonts { ICON_HIDDEN } else { PLAIN_HIDDEN }
}

pub fn attack_icon(nerd_fonts: bool) -> &'static str {
    if nerd_fonts { ICON_BOLT } else { PLAIN_BOLT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_thresholds() {
        let theme = Theme::default();
        assert_eq!(theme.signal_color(85), theme.success);
        assert_eq!(theme.signal_color(55), theme.warning);
        assert_eq!(theme.signal_color(10), theme.error);
        assert_eq!(signal_icon(100, false), "▂▄▆█");
    }

    #[test]
    fn test_encryption_colors_follow_config() {
        let mut cfg = ThemeConfig::default();
        cfg.encryption.open = Color::Rgb(1, 2, 3);
        let theme = Theme::from_config(&cfg);
        assert_eq!(theme.encryption_color(Encryption::Open), Color::Rgb(1, 2, 3));
        assert_eq!(theme.encryption_color(Encryption::Wep), Color::Red);
    }
}
