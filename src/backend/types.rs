use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// BSSID value the backend reports for stations not associated with any AP
pub const NOT_ASSOCIATED: &str = "(not associated)";

/// Encryption kind advertised by an access point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encryption {
    #[serde(rename = "WPA3")]
    Wpa3,
    #[serde(rename = "WPA2")]
    Wpa2,
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "OPEN")]
    Open,
}

impl Encryption {
    pub fn all() -> &'static [Encryption] {
        &[Self::Wpa3, Self::Wpa2, Self::Wpa, Self::Wep, Self::Open]
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wpa3 => write!(f, "WPA3"),
            Self::Wpa2 => write!(f, "WPA2"),
            Self::Wpa => write!(f, "WPA"),
            Self::Wep => write!(f, "WEP"),
            Self::Open => write!(f, "OPEN"),
        }
    }
}

/// A discovered access point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub ssid: String,
    pub bssid: String,
    pub channel: u16,
    pub signal: u8,
    pub encryption: Encryption,
    pub vendor: String,
    pub clients: u32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub first_seen: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_seen: DateTime<Utc>,
}

impl Network {
    pub fn is_hidden(&self) -> bool {
        self.ssid.trim().is_empty()
    }

    /// SSID, or a placeholder for hidden networks
    pub fn display_name(&self) -> &str {
        if self.is_hidden() {
            "Hidden Network"
        } else {
            &self.ssid
        }
    }
}

/// A wireless station, associated with an AP or probing on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub mac: String,
    pub bssid: String,
    pub power: u8,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub lost: u32,
    #[serde(default)]
    pub frames: u32,
    #[serde(default)]
    pub probe: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub first_seen: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_seen: DateTime<Utc>,
}

impl Client {
    /// BSSID of the AP this station talks to, if any
    pub fn associated_bssid(&self) -> Option<&str> {
        if self.bssid == NOT_ASSOCIATED || self.bssid.trim().is_empty() {
            None
        } else {
            Some(&self.bssid)
        }
    }
}

/// Operating mode of a host adapter, as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceMode {
    Normal,
    Monitor,
    Disconnected,
}

impl InterfaceMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Monitor => "monitor",
            Self::Disconnected => "disconnected",
        }
    }
}

/// A host wireless adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiInterface {
    pub name: String,
    pub driver: String,
    pub chipset: String,
    pub status: InterfaceMode,
}

impl WifiInterface {
    pub fn new(name: &str, driver: &str, chipset: &str, status: InterfaceMode) -> Self {
        Self {
            name: name.to_string(),
            driver: driver.to_string(),
            chipset: chipset.to_string(),
            status,
        }
    }

    pub fn is_monitor(&self) -> bool {
        self.status == InterfaceMode::Monitor
    }
}

/// One batch of observations pushed by the scan feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub clients: Vec<Client>,
}

/// Acknowledgement of an imperative backend command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Monitor interface name reported by a monitor-mode start
    pub fn monitor_interface(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.get("monitorInterface"))
            .and_then(|v| v.as_str())
    }
}

/// Backend health summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub status: String,
    pub active_processes: u32,
    pub version: String,
}

impl ServerStatus {
    pub fn unknown() -> Self {
        Self {
            status: "unknown".into(),
            active_processes: 0,
            version: "0.0.0".into(),
        }
    }
}

/// Messages pushed over the scan WebSocket
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    ScanUpdate {
        #[serde(default)]
        networks: Vec<Network>,
        #[serde(default)]
        clients: Vec<Client>,
    },
    #[serde(other)]
    Other,
}

// ── Timestamp parsing ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

/// Accepts epoch milliseconds (number or digit string) or RFC 3339 text
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawTimestamp::deserialize(deserializer)?;
    let parsed = match raw {
        RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
        RawTimestamp::Float(ms) => Utc.timestamp_millis_opt(ms as i64).single(),
        RawTimestamp::Text(s) => parse_timestamp_str(&s),
    };
    parsed.ok_or_else(|| serde::de::Error::custom("invalid timestamp"))
}

pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_accepts_millis_and_rfc3339() {
        let json = r#"{
            "id": "1", "ssid": "HomeWiFi", "bssid": "00:11:22:33:44:55",
            "channel": 6, "signal": 85, "encryption": "WPA2", "vendor": "Netgear",
            "clients": 3, "firstSeen": 1700000000000, "lastSeen": "2023-11-14T22:13:25Z"
        }"#;
        let net: Network = serde_json::from_str(json).unwrap();
        assert_eq!(net.encryption, Encryption::Wpa2);
        assert_eq!(net.first_seen.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(net.last_seen.timestamp(), 1_700_000_005);
    }

    #[test]
    fn test_hidden_network_display_name() {
        let json = r#"{
            "id": "4", "ssid": "", "bssid": "66:77:88:99:AA:BB", "channel": 3,
            "signal": 42, "encryption": "WPA2", "vendor": "Linksys", "clients": 1,
            "firstSeen": "1700000000000", "lastSeen": "1700000000000"
        }"#;
        let net: Network = serde_json::from_str(json).unwrap();
        assert!(net.is_hidden());
        assert_eq!(net.display_name(), "Hidden Network");
    }

    #[test]
    fn test_unknown_encryption_is_rejected() {
        let json = r#"{
            "id": "1", "ssid": "x", "bssid": "00:11:22:33:44:55", "channel": 6,
            "signal": 85, "encryption": "WPA4", "vendor": "v", "clients": 0,
            "firstSeen": 0, "lastSeen": 0
        }"#;
        assert!(serde_json::from_str::<Network>(json).is_err());
    }

    #[test]
    fn test_client_association() {
        let json = r#"{
            "mac": "DE:AD:BE:EF:00:01", "bssid": "(not associated)", "power": 40,
            "rate": "0-1", "lost": 0, "frames": 12, "probe": ["HomeWiFi"],
            "firstSeen": 0, "lastSeen": 0
        }"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.associated_bssid(), None);
        assert_eq!(client.vendor, None);
    }

    #[test]
    fn test_feed_message_scan_update_without_clients() {
        let json = r#"{"type": "scan_update", "networks": []}"#;
        match serde_json::from_str::<FeedMessage>(json).unwrap() {
            FeedMessage::ScanUpdate { networks, clients } => {
                assert!(networks.is_empty());
                assert!(clients.is_empty());
            }
            FeedMessage::Other => panic!("expected scan_update"),
        }
    }

    #[test]
    fn test_feed_message_other_type() {
        let json = r#"{"type": "interface_update", "message": "changed"}"#;
        assert!(matches!(
            serde_json::from_str::<FeedMessage>(json).unwrap(),
            FeedMessage::Other
        ));
    }

    #[test]
    fn test_command_response_monitor_interface() {
        let json = r#"{"success": true, "message": "ok",
            "data": {"monitorInterface": "wlan0mon"}}"#;
        let resp: CommandResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.monitor_interface(), Some("wlan0mon"));
    }

    #[test]
    fn test_server_status_camel_case() {
        let json = r#"{"status": "running", "activeProcesses": 2, "version": "1.0.0"}"#;
        let status: ServerStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.active_processes, 2);
    }
}
