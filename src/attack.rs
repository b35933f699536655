use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{GatewayError, GatewayResult};

/// Destination address meaning "every station on the AP"
pub const BROADCAST_MAC: &str = "FF:FF:FF:FF:FF:FF";

pub const MIN_PACKETS: u32 = 10;
pub const MAX_PACKETS: u32 = 100;
pub const PACKET_STEP: u32 = 5;
pub const DEFAULT_PACKETS: u32 = 50;

const PROGRESS_STEP: u8 = 5;

/// Parse a MAC written with `:` or `-` separators into upper-case colon form
pub fn normalize_mac(input: &str) -> Option<String> {
    let parts: Vec<&str> = input.trim().split([':', '-']).collect();
    if parts.len() != 6 {
        return None;
    }
    let valid = parts
        .iter()
        .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()));
    valid.then(|| parts.join(":").to_ascii_uppercase())
}

/// A deauthentication request as sent to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeauthRequest {
    pub bssid: String,
    pub client_mac: Option<String>,
    pub packets: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeauthBody<'a> {
    bssid: &'a str,
    client_mac: &'a str,
    packets: u32,
}

impl DeauthRequest {
    pub fn new(bssid: &str, client_mac: Option<String>, packets: u32) -> Self {
        Self {
            bssid: bssid.to_string(),
            client_mac,
            packets,
        }
    }

    /// The station that will be targeted; broadcast when none was chosen
    pub fn effective_client(&self) -> &str {
        self.client_mac.as_deref().unwrap_or(BROADCAST_MAC)
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if normalize_mac(&self.bssid).is_none() {
            return Err(GatewayError::InvalidInput(format!("invalid BSSID '{}'", self.bssid)));
        }
        if let Some(mac) = &self.client_mac {
            if normalize_mac(mac).is_none() {
                return Err(GatewayError::InvalidInput(format!("invalid client MAC '{mac}'")));
            }
        }
        if self.packets == 0 {
            return Err(GatewayError::InvalidInput("packet count must be positive".into()));
        }
        Ok(())
    }

    pub fn body(&self) -> DeauthBody<'_> {
        DeauthBody {
            bssid: &self.bssid,
            client_mac: self.effective_client(),
            packets: self.packets,
        }
    }

    pub fn describe(&self) -> String {
        let target = match &self.client_mac {
            Some(mac) => mac.as_str(),
            None => "all clients",
        };
        format!(
            "Deauthentication started against {} targeting {} ({} packets)",
            self.bssid, target, self.packets
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackState {
    Idle,
    Attacking { progress: u8 },
}

/// What happened when the attack clock advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackStep {
    Progress(u8),
    Completed,
}

/// Parameters and lifecycle of the deauthentication form.
///
/// Progress is cosmetic: it advances on a timer, not on backend reports.
#[derive(Debug, Clone)]
pub struct DeauthForm {
    pub packets: u32,
    pub all_clients: bool,
    pub client_mac: Option<String>,
    state: AttackState,
    step_interval: Duration,
    last_step: Option<Instant>,
}

impl Default for DeauthForm {
    fn default() -> Self {
        Self::new(DEFAULT_PACKETS, Duration::from_millis(300))
    }
}

impl DeauthForm {
    pub fn new(default_packets: u32, step_interval: Duration) -> Self {
        Self {
            packets: snap_packets(default_packets),
            all_clients: true,
            client_mac: None,
            state: AttackState::Idle,
            step_interval,
            last_step: None,
        }
    }

    pub fn state(&self) -> AttackState {
        self.state
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.state, AttackState::Attacking { .. })
    }

    pub fn progress(&self) -> u8 {
        match self.state {
            AttackState::Idle => 0,
            AttackState::Attacking { progress } => progress,
        }
    }

    fn ensure_idle(&self) -> GatewayResult<()> {
        if self.is_attacking() {
            Err(GatewayError::InvalidInput("an attack is in progress".into()))
        } else {
            Ok(())
        }
    }

    pub fn increase_packets(&mut self) -> GatewayResult<()> {
        self.ensure_idle()?;
        self.packets = (self.packets + PACKET_STEP).min(MAX_PACKETS);
        Ok(())
    }

    pub fn decrease_packets(&mut self) -> GatewayResult<()> {
        self.ensure_idle()?;
        self.packets = self.packets.saturating_sub(PACKET_STEP).max(MIN_PACKETS);
        Ok(())
    }

    pub fn toggle_all_clients(&mut self) -> GatewayResult<()> {
        self.ensure_idle()?;
        self.all_clients = !self.all_clients;
        Ok(())
    }

    /// Set a specific target station. Clears the all-clients toggle.
    pub fn set_client_mac(&mut self, input: &str) -> GatewayResult<()> {
        self.ensure_idle()?;
        let mac = normalize_mac(input).ok_or_else(|| {
            GatewayError::InvalidInput(format!("'{}' is not a MAC address", input.trim()))
        })?;
        self.client_mac = Some(mac);
        self.all_clients = false;
        Ok(())
    }

    /// Build the request for an AP. Needs a MAC unless all clients are targeted.
    pub fn request(&self, bssid: &str) -> GatewayResult<DeauthRequest> {
        self.ensure_idle()?;
        let client = if self.all_clients {
            None
        } else {
            Some(
                self.client_mac
                    .clone()
                    .ok_or_else(|| GatewayError::InvalidInput("no client MAC set".into()))?,
            )
        };
        let request = DeauthRequest::new(bssid, client, self.packets);
        request.validate()?;
        Ok(request)
    }

    pub fn begin(&mut self, now: Instant) {
        self.state = AttackState::Attacking { progress: 0 };
        self.last_step = Some(now);
    }

    /// Local stop; no request goes to the backend
    pub fn stop(&mut self) {
        self.state = AttackState::Idle;
        self.last_step = None;
    }

    /// Called when the backend rejects the attack
    pub fn abort(&mut self) {
        self.stop();
    }

    pub fn advance(&mut self, now: Instant) -> Option<AttackStep> {
        let AttackState::Attacking { mut progress } = self.state else {
            return None;
        };
        let mut last = self.last_step.unwrap_or(now);
        let mut moved = false;
        while now.duration_since(last) >= self.step_interval && progress < 100 {
            progress = progress.saturating_add(PROGRESS_STEP).min(100);
            last += self.step_interval;
            moved = true;
        }
        self.last_step = Some(last);

        if progress >= 100 {
            self.stop();
            Some(AttackStep::Completed)
        } else if moved {
            self.state = AttackState::Attacking { progress };
            Some(AttackStep::Progress(progress))
        } else {
            None
        }
    }
}

fn snap_packets(value: u32) -> u32 {
    let clamped = value.clamp(MIN_PACKETS, MAX_PACKETS);
    clamped - (clamped - MIN_PACKETS) % PACKET_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("aa-bb-cc-dd-ee-ff").as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(normalize_mac(" 00:11:22:33:44:55 ").as_deref(), Some("00:11:22:33:44:55"));
        assert_eq!(normalize_mac("00:11:22:33:44"), None);
        assert_eq!(normalize_mac("00:11:22:33:44:GG"), None);
        assert_eq!(normalize_mac("001:1:22:33:44:55"), None);
    }

    #[test]
    fn test_request_without_client_targets_broadcast() {
        let form = DeauthForm::default();
        let request = form.request("00:11:22:33:44:55").unwrap();
        assert_eq!(request.effective_client(), BROADCAST_MAC);
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body["clientMac"], BROADCAST_MAC);
        assert_eq!(body["packets"], 50);
    }

    #[test]
    fn test_packet_bounds() {
        let mut form = DeauthForm::default();
        for _ in 0..20 {
            form.increase_packets().unwrap();
        }
        assert_eq!(form.packets, MAX_PACKETS);
        for _ in 0..30 {
            form.decrease_packets().unwrap();
        }
        assert_eq!(form.packets, MIN_PACKETS);
        assert_eq!(DeauthForm::new(37, Duration::from_millis(300)).packets, 35);
        assert_eq!(DeauthForm::new(500, Duration::from_millis(300)).packets, 100);
    }

    #[test]
    fn test_specific_client_requires_mac() {
        let mut form = DeauthForm::default();
        form.toggle_all_clients().unwrap();
        assert!(form.request("00:11:22:33:44:55").is_err());

        assert!(form.set_client_mac("not-a-mac").is_err());
        form.set_client_mac("de:ad:be:ef:00:01").unwrap();
        let request = form.request("00:11:22:33:44:55").unwrap();
        assert_eq!(request.effective_client(), "DE:AD:BE:EF:00:01");
    }

    #[test]
    fn test_inputs_locked_while_attacking() {
        let mut form = DeauthForm::default();
        form.begin(Instant::now());
        assert!(form.increase_packets().is_err());
        assert!(form.toggle_all_clients().is_err());
        assert!(form.set_client_mac("00:11:22:33:44:55").is_err());
        assert!(form.request("00:11:22:33:44:55").is_err());
        assert_eq!(form.packets, DEFAULT_PACKETS);

        form.stop();
        assert!(form.increase_packets().is_ok());
    }

    #[test]
    fn test_progress_completes_and_returns_idle() {
        let start = Instant::now();
        let mut form = DeauthForm::new(50, Duration::from_millis(300));
        form.begin(start);

        assert_eq!(form.advance(start + Duration::from_millis(100)), None);
        assert_eq!(
            form.advance(start + Duration::from_millis(300)),
            Some(AttackStep::Progress(5))
        );
        assert_eq!(
            form.advance(start + Duration::from_millis(900)),
            Some(AttackStep::Progress(15))
        );
        assert_eq!(
            form.advance(start + Duration::from_secs(6)),
            Some(AttackStep::Completed)
        );
        assert_eq!(form.state(), AttackState::Idle);
        assert_eq!(form.advance(start + Duration::from_secs(7)), None);
    }

    #[test]
    fn test_abort_resets_progress() {
        let start = Instant::now();
        let mut form = DeauthForm::default();
        form.begin(start);
        form.advance(start + Duration::from_millis(600));
        assert_eq!(form.progress(), 10);
        form.abort();
        assert_eq!(form.progress(), 0);
        assert!(!form.is_attacking());
    }

    #[test]
    fn test_validate_rejects_zero_packets() {
        let request = DeauthRequest::new("00:11:22:33:44:55", None, 0);
        assert!(request.validate().is_err());
    }
}
