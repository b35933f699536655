use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ratatui::style::Color;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::attack::DEFAULT_PACKETS;
use crate::backend::simulator::SimulatorSettings;
use crate::backend::{BackendMode, GatewaySettings};

// ─── Embedded Default ────────────────────────────────────────────────────
/// Baked into the binary; always available as the base layer.
const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

// ─── CLI Arguments (override layer) ─────────────────────────────────────
/// melon: a terminal console for a WiFi reconnaissance backend
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "melon", version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// REST base URL of the backend (overrides config file)
    #[arg(long)]
    pub api_url: Option<String>,

    /// WebSocket base URL of the backend (overrides config file)
    #[arg(long)]
    pub ws_url: Option<String>,

    /// What to do when the backend is unreachable
    #[arg(short, long, value_enum)]
    pub mode: Option<BackendMode>,

    /// Interface to select on startup (overrides config file)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Log level filter (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log file path (defaults to the data directory)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Target FPS for the render loop (overrides config file)
    #[arg(long)]
    pub fps: Option<u16>,

    /// Disable Nerd Font icons (overrides config file)
    #[arg(long)]
    pub no_nerd_fonts: bool,

    /// Print the default config to stdout and exit
    #[arg(long)]
    pub print_default_config: bool,
}

// ─── TOML Structs ───────────────────────────────────────────────────────

/// Root configuration, parsed from TOML and then overridden by CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub attack: AttackConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Interface to preselect (empty string = first monitor interface)
    pub interface: String,
    pub log_level: String,
    pub interface_poll_secs: u64,
    pub status_poll_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub api_url: String,
    pub ws_url: String,
    pub request_timeout_secs: u64,
    pub mode: BackendMode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub interval_ms: u64,
    /// Fixed RNG seed; absent means a fresh seed every run
    pub seed: Option<u64>,
    pub max_networks: usize,
    pub max_clients: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub default_packets: u32,
    pub progress_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub fps: u16,
    pub nerd_fonts: bool,
    pub show_help_bar: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub fg_dim: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub accent: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub success: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub warning: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub error: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selected_bg: Color,
    pub encryption: EncryptionColors,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncryptionColors {
    #[serde(deserialize_with = "deserialize_color")]
    pub wpa3: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub wpa2: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub wpa: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub wep: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub open: Color,
}

// ─── Defaults ───────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            log_level: "info".into(),
            interface_poll_secs: 5,
            status_poll_secs: 10,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".into(),
            ws_url: "ws://localhost:5000/ws".into(),
            request_timeout_secs: 5,
            mode: BackendMode::Auto,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let sim = SimulatorSettings::default();
        Self {
            interval_ms: 2000,
            seed: None,
            max_networks: sim.max_networks,
            max_clients: sim.max_clients,
        }
    }
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            default_packets: DEFAULT_PACKETS,
            progress_interval_ms: 300,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            nerd_fonts: true,
            show_help_bar: true,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            fg: Color::White,
            fg_dim: Color::DarkGray,
            accent: Color::Cyan,
            border: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            selected_bg: Color::DarkGray,
            encryption: EncryptionColors::default(),
        }
    }
}

impl Default for EncryptionColors {
    fn default() -> Self {
        Self {
            wpa3: Color::Green,
            wpa2: Color::Blue,
            wpa: Color::Yellow,
            wep: Color::Red,
            open: Color::Magenta,
        }
    }
}

// ─── Color Deserializer ─────────────────────────────────────────────────

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: \"{s}\"")))
}

/// Parse a color string into a ratatui Color.
/// Supports: named colors, "reset", "#RRGGBB" hex.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "reset" | "default" | "transparent" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" | "dark_gray" | "dark_grey" => Some(Color::DarkGray),
        "lightred" | "light_red" => Some(Color::LightRed),
        "lightgreen" | "light_green" => Some(Color::LightGreen),
        "lightyellow" | "light_yellow" => Some(Color::LightYellow),
        "lightblue" | "light_blue" => Some(Color::LightBlue),
        "lightmagenta" | "light_magenta" => Some(Color::LightMagenta),
        "lightcyan" | "light_cyan" => Some(Color::LightCyan),
        hex if hex.starts_with('#') && hex.len() == 7 && hex.is_ascii() => {
            let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
            let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
            let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

// ─── Path Resolution ────────────────────────────────────────────────────

impl Config {
    /// Standard config file path: ~/.config/melon/config.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("melon")
            .join("config.toml")
    }

    /// Log directory: ~/.local/share/melon/
    pub fn log_dir() -> PathBuf {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("melon");
        std::fs::create_dir_all(&data_dir).ok();
        data_dir
    }

    /// Interface as Option<&str> (empty = None)
    pub fn interface(&self) -> Option<&str> {
        let iface = self.general.interface.trim();
        if iface.is_empty() { None } else { Some(iface) }
    }

    /// Tick interval from FPS
    pub fn tick_rate(&self) -> Duration {
        let fps = self.appearance.fps.max(1);
        Duration::from_millis(1000 / fps as u64)
    }

    pub fn interface_poll(&self) -> Duration {
        Duration::from_secs(self.general.interface_poll_secs.max(1))
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_secs(self.general.status_poll_secs.max(1))
    }

    pub fn attack_step(&self) -> Duration {
        Duration::from_millis(self.attack.progress_interval_ms.max(10))
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            api_url: self.backend.api_url.clone(),
            ws_url: self.backend.ws_url.clone(),
            request_timeout: Duration::from_secs(self.backend.request_timeout_secs.max(1)),
            mode: self.backend.mode,
            sim_interval: Duration::from_millis(self.simulation.interval_ms.max(50)),
            simulator: SimulatorSettings {
                seed: self.simulation.seed,
                max_networks: self.simulation.max_networks,
                max_clients: self.simulation.max_clients,
            },
        }
    }
}

// ─── Bootloader ─────────────────────────────────────────────────────────

/// The single entry point for configuration. Called once at startup.
///
/// 1. Resolve config file path (CLI override or default)
/// 2. If the file doesn't exist, create the directory tree and write defaults
/// 3. Parse TOML from disk into Config
/// 4. Apply CLI overrides on top
pub fn load(cli: &CliArgs) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG_TOML).wrap_err_with(|| {
            format!("Failed to write default config to {}", config_path.display())
        })?;
        info!("Created default config at {}", config_path.display());
    }

    let toml_str = std::fs::read_to_string(&config_path)
        .wrap_err_with(|| format!("Failed to read config from {}", config_path.display()))?;

    let mut config: Config = toml::from_str(&toml_str).wrap_err_with(|| {
        format!(
            "Failed to parse config at {}.\n\
             Delete the file to regenerate defaults, or run:\n  \
             melon --print-default-config > {:?}",
            config_path.display(),
            config_path
        )
    })?;

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &CliArgs) {
    if let Some(ref url) = cli.api_url {
        config.backend.api_url = url.clone();
    }
    if let Some(ref url) = cli.ws_url {
        config.backend.ws_url = url.clone();
    }
    if let Some(mode) = cli.mode {
        config.backend.mode = mode;
    }
    if let Some(ref iface) = cli.interface {
        config.general.interface = iface.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    if cli.no_nerd_fonts {
        config.appearance.nerd_fonts = false;
    }
    if let Some(fps) = cli.fps {
        config.appearance.fps = fps;
    }
}

/// Returns the embedded default config TOML string.
pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_parses_to_defaults() {
        let parsed: Config = toml::from_str(default_config_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.backend.api_url, defaults.backend.api_url);
        assert_eq!(parsed.backend.mode, BackendMode::Auto);
        assert_eq!(parsed.general.status_poll_secs, 10);
        assert_eq!(parsed.attack.default_packets, 50);
        assert_eq!(parsed.theme.encryption.wep, Color::Red);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r##"
            [backend]
            mode = "demo"

            [theme]
            accent = "#ff8800"
            "##,
        )
        .unwrap();
        assert_eq!(parsed.backend.mode, BackendMode::Demo);
        assert_eq!(parsed.backend.ws_url, "ws://localhost:5000/ws");
        assert_eq!(parsed.theme.accent, Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(parsed.theme.fg, Color::White);
        assert_eq!(parsed.simulation.seed, None);
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[theme]\nfg = \"chartreuse\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("Dark_Gray"), Some(Color::DarkGray));
        assert_eq!(parse_color("#00ff00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(parse_color("#00ff0"), None);
    }

    #[test]
    fn test_non_ascii_hex_color_is_rejected() {
        // Seven bytes, but the slice boundaries fall inside 'é'
        assert_eq!("#aébcd".len(), 7);
        assert_eq!(parse_color("#aébcd"), None);
        assert_eq!(parse_color("#ÄÄÄ"), None);

        let result: std::result::Result<Config, _> =
            toml::from_str("[theme]\naccent = \"#aébcd\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cli = CliArgs {
            config: Some(path.clone()),
            ..Default::default()
        };
        let config = load(&cli).unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), default_config_toml());
        assert_eq!(config.general.interface_poll_secs, 5);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[general]\ninterface = \"wlan0\"\n[backend]\napi_url = \"http://10.0.0.2:5000/api\"\n",
        )
        .unwrap();
        let cli = CliArgs {
            config: Some(path),
            interface: Some("wlan1mon".into()),
            mode: Some(BackendMode::Live),
            fps: Some(60),
            no_nerd_fonts: true,
            ..Default::default()
        };
        let config = load(&cli).unwrap();
        assert_eq!(config.interface(), Some("wlan1mon"));
        assert_eq!(config.backend.api_url, "http://10.0.0.2:5000/api");
        assert_eq!(config.backend.mode, BackendMode::Live);
        assert!(!config.appearance.nerd_fonts);
        assert_eq!(config.tick_rate(), Duration::from_millis(16));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend\nmode = 3").unwrap();
        let cli = CliArgs {
            config: Some(path.clone()),
            ..Default::default()
        };
        let err = load(&cli).unwrap_err();
        assert!(format!("{err}").contains(&path.display().to_string()));
    }

    #[test]
    fn test_gateway_settings_from_config() {
        let mut config = Config::default();
        config.simulation.seed = Some(7);
        config.simulation.interval_ms = 500;
        let settings = config.gateway_settings();
        assert_eq!(settings.simulator.seed, Some(7));
        assert_eq!(settings.sim_interval, Duration::from_millis(500));
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
    }
}
