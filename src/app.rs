use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::animation::AnimationState;
use crate::attack::{AttackStep, DeauthForm, DeauthRequest};
use crate::backend::types::CommandResponse;
use crate::backend::{
    BackendMode, Client, FeedStatus, Network, Outcome, ServerStatus, WifiInterface,
};
use crate::config::Config;
use crate::event::{Event, GatewayCommand};
use crate::session::{self, ScanSession};
use crate::transcript::Transcript;
use crate::ui::components::confirm_dialog::ConfirmDialog;
use crate::ui::components::input_dialog::InputDialog;
use crate::ui::theme::Theme;

const CONSOLE_SCROLL_STEP: usize = 5;

// ── Page & Mode enums ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Networks,
    Clients,
    Topology,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Networks, Page::Clients, Page::Topology];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    fn next(&self) -> Page {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Page {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Filtering,
    /// Attack modal is open
    Attack,
    /// MAC entry on top of the attack modal
    Input,
    /// Confirmation on top of the attack modal
    Dialog,
}

// ── Per-page state ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub selected_index: usize,
}

impl ListState {
    fn up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    fn down(&mut self, len: usize) {
        if len > 0 && self.selected_index < len - 1 {
            self.selected_index += 1;
        }
    }

    fn first(&mut self) {
        self.selected_index = 0;
    }

    fn last(&mut self, len: usize) {
        self.selected_index = len.saturating_sub(1);
    }

    fn clamp(&mut self, len: usize) {
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }
}

/// Target of the attack modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackTarget {
    pub bssid: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub enum PendingAction {
    LaunchAttack(DeauthRequest),
}

// ── Application State ─────────────────────────────────────────────────

pub struct App {
    pub active_page: Page,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub nerd_fonts: bool,
    pub show_help_bar: bool,
    pub animation: AnimationState,

    // Backend view
    pub backend_mode: BackendMode,
    pub api_url: String,
    pub interfaces: Vec<WifiInterface>,
    pub interfaces_simulated: bool,
    pub selected_interface: Option<String>,
    preferred_interface: Option<String>,
    pub server_status: Option<Outcome<ServerStatus>>,
    pub feed_status: FeedStatus,

    // Scan lifecycle
    pub scanning: bool,
    pub scan_pending: bool,
    pub session: ScanSession,
    pub transcript: Transcript,

    // Per-page state
    pub filter: String,
    pub interfaces_state: ListState,
    pub networks_state: ListState,
    pub clients_state: ListState,

    // Attack modal
    pub attack: DeauthForm,
    pub attack_target: Option<AttackTarget>,

    // Dialogs
    pub input_dialog: InputDialog,
    pub confirm_dialog: ConfirmDialog,
    pub pending_action: Option<PendingAction>,

    // Toast notification
    pub toast_message: Option<String>,
    pub toast_is_error: bool,
    pub toast_ticks: u16,
    toast_length: u16,

    event_tx: mpsc::UnboundedSender<Event>,
}

impl App {
    pub fn new(event_tx: mpsc::UnboundedSender<Event>, config: &Config) -> Self {
        let fps = config.appearance.fps.max(1);
        Self {
            active_page: Page::Dashboard,
            mode: Mode::Normal,
            should_quit: false,
            theme: Theme::from_config(&config.theme),
            nerd_fonts: config.appearance.nerd_fonts,
            show_help_bar: config.appearance.show_help_bar,
            animation: AnimationState::default(),

            backend_mode: config.backend.mode,
            api_url: config.backend.api_url.clone(),
            interfaces: Vec::new(),
            interfaces_simulated: false,
            selected_interface: None,
            preferred_interface: config.interface().map(String::from),
            server_status: None,
            feed_status: FeedStatus::Idle,

            scanning: false,
            scan_pending: false,
            session: ScanSession::default(),
            transcript: Transcript::default(),

            filter: String::new(),
            interfaces_state: ListState::default(),
            networks_state: ListState::default(),
            clients_state: ListState::default(),

            attack: DeauthForm::new(config.attack.default_packets, config.attack_step()),
            attack_target: None,

            input_dialog: InputDialog::new("", ""),
            confirm_dialog: ConfirmDialog::new(),
            pending_action: None,

            toast_message: None,
            toast_is_error: false,
            toast_ticks: 0,
            // ~3 seconds
            toast_length: fps.saturating_mul(3),

            event_tx,
        }
    }

    fn send(&self, command: GatewayCommand) {
        if self.event_tx.send(Event::Command(command)).is_err() {
            warn!("Event channel closed, dropping command");
        }
    }

    fn log(&mut self, message: impl AsRef<str>) {
        info!("{}", message.as_ref());
        self.transcript.push(message);
    }

    /// Networks matching the current filter, in feed order
    pub fn filtered_networks(&self) -> Vec<&Network> {
        session::filter(self.session.networks(), &self.filter)
    }

    pub fn filtered_clients(&self) -> Vec<&Client> {
        session::filter(self.session.clients(), &self.filter)
    }

    pub fn is_simulated(&self) -> bool {
        self.feed_status == FeedStatus::Simulated
            || self.interfaces_simulated
            || self
                .server_status
                .as_ref()
                .is_some_and(Outcome::is_simulated)
    }

    /// Handle a key event, dispatching to the appropriate handler
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Input => return self.handle_input_key(key),
            Mode::Dialog => return self.handle_dialog_key(key),
            Mode::Filtering => return self.handle_filter_key(key),
            Mode::Attack => return self.handle_attack_key(key),
            Mode::Normal => {}
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.active_page = self.active_page.next();
                return;
            }
            KeyCode::BackTab => {
                self.active_page = self.active_page.prev();
                return;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.active_page = Page::ALL[idx];
                return;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.trigger_refresh();
                return;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.start_scan();
                return;
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.stop_scan();
                return;
            }
            _ => {}
        }

        match self.active_page {
            Page::Dashboard => self.handle_dashboard_key(key),
            Page::Networks => self.handle_networks_key(key),
            Page::Clients => self.handle_clients_key(key),
            Page::Topology => {}
        }
    }

    // ── Toast Management ──────────────────────────────────────────────

    pub fn show_toast(&mut self, message: &str, is_error: bool) {
        self.toast_message = Some(message.to_string());
        self.toast_is_error = is_error;
        self.toast_ticks = self.toast_length.max(1);
    }

    pub fn tick_toast(&mut self) {
        if self.toast_ticks > 0 {
            self.toast_ticks -= 1;
            if self.toast_ticks == 0 {
                self.toast_message = None;
            }
        }
    }

    // ── Dashboard Keys ────────────────────────────────────────────────

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        let count = self.interfaces.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.interfaces_state.up(),
            KeyCode::Down | KeyCode::Char('j') => self.interfaces_state.down(count),
            KeyCode::Enter => {
                if let Some(iface) = self.interfaces.get(self.interfaces_state.selected_index) {
                    let name = iface.name.clone();
                    self.log(format!("Selected interface {name}"));
                    self.selected_interface = Some(name);
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') => self.toggle_monitor(),
            KeyCode::PageUp => self.transcript.scroll_up(CONSOLE_SCROLL_STEP),
            KeyCode::PageDown => self.transcript.scroll_down(CONSOLE_SCROLL_STEP),
            KeyCode::End => self.transcript.follow(),
            _ => {}
        }
    }

    fn toggle_monitor(&mut self) {
        let Some(iface) = self.interfaces.get(self.interfaces_state.selected_index) else {
            self.show_toast("No interface available", true);
            return;
        };
        let name = iface.name.clone();
        if iface.is_monitor() {
            self.log(format!("Stopping monitor mode on {name}"));
            self.send(GatewayCommand::StopMonitor(name));
        } else {
            self.log(format!("Starting monitor mode on {name}"));
            self.send(GatewayCommand::StartMonitor(name));
        }
    }

    // ── Scan lifecycle ────────────────────────────────────────────────

    fn start_scan(&mut self) {
        if self.scanning || self.scan_pending {
            self.show_toast("Scan already running", false);
            return;
        }
        let Some(iface) = self.selected_interface.clone() else {
            self.show_toast("Select an interface first", true);
            return;
        };
        self.session.clear();
        self.networks_state.first();
        self.clients_state.first();
        self.scan_pending = true;
        self.animation.start_spinner();
        self.log(format!("Starting scan on {iface}"));
        self.send(GatewayCommand::StartScan(iface));
    }

    fn stop_scan(&mut self) {
        if !self.scanning && !self.scan_pending {
            return;
        }
        self.scanning = false;
        self.scan_pending = false;
        self.animation.stop_spinner();
        self.send(GatewayCommand::StopScan);
        self.log("Scan stopped");
    }

    // ── Networks / Clients Keys ───────────────────────────────────────

    fn handle_networks_key(&mut self, key: KeyEvent) {
        let count = self.filtered_networks().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.networks_state.up(),
            KeyCode::Down | KeyCode::Char('j') => self.networks_state.down(count),
            KeyCode::Home | KeyCode::Char('g') => self.networks_state.first(),
            KeyCode::End | KeyCode::Char('G') => self.networks_state.last(count),
            KeyCode::Char('/') => self.begin_filter(),
            KeyCode::Enter => self.select_network(),
            _ => {}
        }
    }

    fn handle_clients_key(&mut self, key: KeyEvent) {
        let count = self.filtered_clients().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.clients_state.up(),
            KeyCode::Down | KeyCode::Char('j') => self.clients_state.down(count),
            KeyCode::Home | KeyCode::Char('g') => self.clients_state.first(),
            KeyCode::End | KeyCode::Char('G') => self.clients_state.last(count),
            KeyCode::Char('/') => self.begin_filter(),
            KeyCode::Enter => self.select_client(),
            _ => {}
        }
    }

    fn select_network(&mut self) {
        let Some(net) = self
            .filtered_networks()
            .get(self.networks_state.selected_index)
            .map(|n| (*n).clone())
        else {
            return;
        };
        self.log(format!("Selected network {} ({})", net.display_name(), net.bssid));
        self.open_attack(AttackTarget {
            label: net.display_name().to_string(),
            bssid: net.bssid,
        });
    }

    /// Open the attack form against the client's AP, aimed at that client
    fn select_client(&mut self) {
        let Some(client) = self
            .filtered_clients()
            .get(self.clients_state.selected_index)
            .map(|c| (*c).clone())
        else {
            return;
        };
        let Some(bssid) = client.associated_bssid().map(String::from) else {
            self.show_toast("Client is not associated with an access point", true);
            return;
        };
        let label = self
            .session
            .network(&bssid)
            .map(|n| n.display_name().to_string())
            .unwrap_or_else(|| bssid.clone());
        self.log(format!("Selected client {} on {}", client.mac, label));
        self.open_attack(AttackTarget { bssid, label });
        if !self.attack.is_attacking() {
            if let Err(e) = self.attack.set_client_mac(&client.mac) {
                self.show_toast(&e.to_string(), true);
            }
        }
    }

    // ── Attack modal ──────────────────────────────────────────────────

    fn open_attack(&mut self, target: AttackTarget) {
        if self.attack.is_attacking() && self.attack_target.as_ref() != Some(&target) {
            self.show_toast("Another attack is running", true);
            return;
        }
        self.attack_target = Some(target);
        self.mode = Mode::Attack;
    }

    fn handle_attack_key(&mut self, key: KeyEvent) {
        let result = match key.code {
            KeyCode::Esc => {
                if self.attack.is_attacking() {
                    self.stop_attack();
                } else {
                    self.mode = Mode::Normal;
                }
                Ok(())
            }
            KeyCode::Char('s') | KeyCode::Char('S') if self.attack.is_attacking() => {
                self.stop_attack();
                Ok(())
            }
            KeyCode::Left | KeyCode::Char('-') | KeyCode::Char('h') => {
                self.attack.decrease_packets()
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('l') => {
                self.attack.increase_packets()
            }
            KeyCode::Char(' ') | KeyCode::Char('a') => self.attack.toggle_all_clients(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                if self.attack.is_attacking() {
                    Ok(())
                } else {
                    self.input_dialog =
                        InputDialog::new("Target client", "Client MAC (XX:XX:XX:XX:XX:XX):");
                    self.input_dialog.show();
                    self.mode = Mode::Input;
                    Ok(())
                }
            }
            KeyCode::Enter => {
                self.confirm_attack();
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.show_toast(&e.to_string(), true);
        }
    }

    fn confirm_attack(&mut self) {
        let Some(target) = self.attack_target.clone() else {
            return;
        };
        match self.attack.request(&target.bssid) {
            Ok(request) => {
                let client = if request.client_mac.is_some() {
                    request.effective_client()
                } else {
                    "all clients"
                };
                let message = format!(
                    "Deauth {} -> {} ({} packets)?",
                    target.label, client, request.packets
                );
                self.pending_action = Some(PendingAction::LaunchAttack(request));
                self.confirm_dialog.show(
                    "Launch attack",
                    &message,
                    Some("Only attack networks you are authorized to test".into()),
                );
                self.mode = Mode::Dialog;
            }
            Err(e) => self.show_toast(&e.to_string(), true),
        }
    }

    fn stop_attack(&mut self) {
        self.attack.stop();
        self.log("Deauthentication attack stopped");
    }

    // ── Input Dialog Handler ──────────────────────────────────────────

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_dialog.hide();
                self.mode = Mode::Attack;
            }
            KeyCode::Enter => {
                let value = self.input_dialog.value().to_string();
                self.input_dialog.hide();
                self.mode = Mode::Attack;
                self.on_input_submit(&value);
            }
            KeyCode::Backspace => self.input_dialog.delete_char(),
            KeyCode::Delete => self.input_dialog.delete_forward(),
            KeyCode::Left => self.input_dialog.move_left(),
            KeyCode::Right => self.input_dialog.move_right(),
            KeyCode::Home => self.input_dialog.move_start(),
            KeyCode::End => self.input_dialog.move_end(),
            KeyCode::Char(c) => self.input_dialog.insert_char(c),
            _ => {}
        }
    }

    fn on_input_submit(&mut self, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        if let Err(e) = self.attack.set_client_mac(value) {
            self.show_toast(&e.to_string(), true);
        }
    }

    // ── Confirm Dialog Handler ────────────────────────────────────────

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.confirm_dialog.hide();
                self.mode = Mode::Attack;
                self.on_confirm();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_dialog.hide();
                self.pending_action = None;
                self.mode = Mode::Attack;
            }
            _ => {}
        }
    }

    fn on_confirm(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };
        match action {
            PendingAction::LaunchAttack(request) => {
                self.attack.begin(Instant::now());
                self.log(format!(
                    "Launching deauthentication against {} targeting {} ({} packets)",
                    request.bssid,
                    request.effective_client(),
                    request.packets
                ));
                self.send(GatewayCommand::Deauth(request));
            }
        }
    }

    // ── Filter Handler ────────────────────────────────────────────────

    fn begin_filter(&mut self) {
        self.filter.clear();
        self.mode = Mode::Filtering;
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(c) => self.filter.push(c),
            _ => return,
        }
        self.networks_state.first();
        self.clients_state.first();
    }

    // ── Refresh ───────────────────────────────────────────────────────

    pub fn trigger_refresh(&self) {
        self.send(GatewayCommand::RefreshInterfaces);
        self.send(GatewayCommand::RefreshStatus);
    }

    // ── Backend replies ───────────────────────────────────────────────

    fn on_interfaces(&mut self, outcome: Outcome<Vec<WifiInterface>>) {
        self.interfaces_simulated = outcome.is_simulated();
        self.interfaces = outcome.into_value();
        self.interfaces_state.clamp(self.interfaces.len());

        let still_present = self
            .selected_interface
            .as_ref()
            .is_some_and(|sel| self.interfaces.iter().any(|i| &i.name == sel));
        if still_present {
            return;
        }
        let preferred = self
            .preferred_interface
            .as_ref()
            .filter(|p| self.interfaces.iter().any(|i| &i.name == *p))
            .cloned();
        let chosen = preferred.or_else(|| {
            self.interfaces
                .iter()
                .find(|i| i.is_monitor())
                .map(|i| i.name.clone())
        });
        if let Some(name) = chosen {
            if self.selected_interface.as_ref() != Some(&name) {
                self.log(format!("Using interface {name}"));
            }
            self.selected_interface = Some(name);
        }
    }

    fn on_monitor(&mut self, interface: String, enable: bool, outcome: Outcome<CommandResponse>) {
        let simulated = outcome.is_simulated();
        let response = outcome.into_value();
        if !response.success {
            let msg = format!("Monitor mode change on {interface} failed: {}", response.message);
            self.log(&msg);
            self.show_toast(&msg, true);
            return;
        }

        let suffix = if simulated { " [simulated]" } else { "" };
        self.log(format!("{}{suffix}", response.message));
        if enable {
            let name = response
                .monitor_interface()
                .map(String::from)
                .unwrap_or(interface);
            self.log(format!("Monitor interface {name} selected"));
            self.selected_interface = Some(name);
        } else if self.selected_interface.as_deref() == Some(interface.as_str()) {
            self.selected_interface = None;
        }
        self.show_toast(&response.message, false);
        self.send(GatewayCommand::RefreshInterfaces);
    }

    fn on_scan_started(&mut self, interface: String, outcome: Outcome<CommandResponse>) {
        if !self.scan_pending {
            // Stopped before the backend answered
            return;
        }
        self.scan_pending = false;
        let simulated = outcome.is_simulated();
        let response = outcome.into_value();
        if response.success {
            self.scanning = true;
            let suffix = if simulated { " [simulated]" } else { "" };
            self.log(format!("Started scanning on {interface}{suffix}"));
        } else {
            self.animation.stop_spinner();
            let msg = format!("Scan failed on {interface}: {}", response.message);
            self.log(&msg);
            self.show_toast(&msg, true);
        }
    }

    fn on_scan_batch(&mut self, batch: crate::backend::ScanResult) {
        if !self.scanning {
            return;
        }
        let found = self.session.apply(batch);
        for net in &found.networks {
            self.log(format!(
                "New network discovered: {} ({}, ch {}, {})",
                net.display_name(),
                net.bssid,
                net.channel,
                net.encryption
            ));
        }
        for client in &found.clients {
            self.log(format!("New client discovered: {}", client.mac));
        }
        let networks = self.filtered_networks().len();
        let clients = self.filtered_clients().len();
        self.networks_state.clamp(networks);
        self.clients_state.clamp(clients);
    }

    fn on_attack_ack(&mut self, request: DeauthRequest, outcome: Outcome<CommandResponse>) {
        let simulated = outcome.is_simulated();
        let response = outcome.into_value();
        if !response.success {
            self.on_attack_failed(format!("Attack rejected: {}", response.message));
            return;
        }
        if simulated {
            self.log(format!("{} [simulated, no frames sent]", request.describe()));
        } else {
            self.log(&response.message);
        }
    }

    fn on_attack_failed(&mut self, message: String) {
        self.attack.abort();
        self.log(&message);
        self.show_toast(&message, true);
    }

    /// Handle events from the event loop
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick => {
                self.tick_toast();
                self.animation.tick();
                if let Some(AttackStep::Completed) = self.attack.advance(Instant::now()) {
                    self.log("Deauthentication attack completed");
                    self.show_toast("Attack completed", false);
                }
            }
            Event::Resize => {}
            // Routed to the dispatcher by the main loop
            Event::Command(_) => {}
            Event::ScanBatch(batch) => self.on_scan_batch(batch),
            Event::FeedChanged(status) => {
                let line = match &status {
                    FeedStatus::Failed(reason) => format!("Scan feed failed: {reason}"),
                    FeedStatus::Simulated => {
                        "Scan feed: SIMULATED data (backend unreachable)".to_string()
                    }
                    other => format!("Scan feed: {}", other.label()),
                };
                if matches!(status, FeedStatus::Failed(_)) {
                    self.show_toast(&line, true);
                }
                self.log(line);
                self.feed_status = status;
            }
            Event::Interfaces(outcome) => self.on_interfaces(outcome),
            Event::Status(outcome) => self.server_status = Some(outcome),
            Event::Monitor {
                interface,
                enable,
                outcome,
            } => self.on_monitor(interface, enable, outcome),
            Event::ScanStarted { interface, outcome } => self.on_scan_started(interface, outcome),
            Event::AttackAck { request, outcome } => self.on_attack_ack(request, outcome),
            Event::AttackFailed(msg) => self.on_attack_failed(msg),
            Event::ScanFailed(msg) => {
                self.scan_pending = false;
                self.animation.stop_spinner();
                self.log(&msg);
                self.show_toast(&msg, true);
            }
            Event::Error(msg) => {
                self.log(&msg);
                self.show_toast(&msg, true);
            }
        }
    }
}
