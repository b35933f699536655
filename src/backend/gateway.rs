use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::feed::{
    FallbackSource, FeedStatus, ScanHub, ScanSource, SimulatedSource, Subscription,
    WebSocketSource,
};
use super::simulator::SimulatorSettings;
use super::types::{CommandResponse, InterfaceMode, ScanResult, ServerStatus, WifiInterface};
use crate::attack::DeauthRequest;
use crate::error::{GatewayError, GatewayResult};

/// How the gateway behaves when the backend cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Talk to the backend, substitute simulated data when it is unreachable
    Auto,
    /// Talk to the backend only; failures are reported as errors
    Live,
    /// Never contact the backend; everything is simulated
    Demo,
}

impl BackendMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Live => "live",
            Self::Demo => "demo",
        }
    }
}

/// A gateway result tagged with whether it came from the backend
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Live(T),
    Simulated { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Live(v) => v,
            Self::Simulated { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Live(v) => v,
            Self::Simulated { value, .. } => value,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated { .. })
    }
}

/// Connection settings for the gateway
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_url: String,
    pub ws_url: String,
    pub request_timeout: Duration,
    pub mode: BackendMode,
    pub sim_interval: Duration,
    pub simulator: SimulatorSettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".into(),
            ws_url: "ws://localhost:5000/ws".into(),
            request_timeout: Duration::from_secs(5),
            mode: BackendMode::Auto,
            sim_interval: Duration::from_secs(2),
            simulator: SimulatorSettings::default(),
        }
    }
}

#[derive(Serialize)]
struct InterfaceBody<'a> {
    interface: &'a str,
}

/// Single point of contact with the reconnaissance backend.
/// All backend operations go through this struct.
pub struct Gateway {
    http: HttpClient,
    api_url: String,
    mode: BackendMode,
    hub: ScanHub,
}

impl Gateway {
    pub fn new(settings: GatewaySettings) -> GatewayResult<Self> {
        let http = HttpClient::builder()
            .timeout(settings.request_timeout)
            .build()?;

        let simulated: Arc<dyn ScanSource> = Arc::new(SimulatedSource::new(
            settings.sim_interval,
            settings.simulator.clone(),
        ));
        let live: Arc<dyn ScanSource> = Arc::new(WebSocketSource::new(
            &settings.ws_url,
            settings.request_timeout,
        ));
        let source: Arc<dyn ScanSource> = match settings.mode {
            BackendMode::Auto => Arc::new(FallbackSource::new(live, simulated)),
            BackendMode::Live => live,
            BackendMode::Demo => simulated,
        };

        Ok(Self::with_source(settings, http, source))
    }

    /// Build a gateway around an arbitrary scan source
    pub fn with_source(
        settings: GatewaySettings,
        http: HttpClient,
        source: Arc<dyn ScanSource>,
    ) -> Self {
        Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            mode: settings.mode,
            hub: ScanHub::new(source),
        }
    }

    pub fn feed_status(&self) -> FeedStatus {
        self.hub.status()
    }

    // ── Interfaces ────────────────────────────────────────────────────

    /// List host wireless adapters
    pub async fn list_interfaces(&self) -> GatewayResult<Outcome<Vec<WifiInterface>>> {
        let result = self.get_json("/interfaces/").await;
        self.settle(result, fallback_interfaces)
    }

    pub async fn start_monitor_mode(
        &self,
        interface: &str,
    ) -> GatewayResult<Outcome<CommandResponse>> {
        let interface = require_interface(interface)?;
        let result = self
            .post_json("/monitor/start/", &InterfaceBody { interface })
            .await;
        self.settle(result, || {
            CommandResponse::ok(format!("Started monitor mode on {interface}"))
                .with_data(serde_json::json!({ "monitorInterface": format!("{interface}mon") }))
        })
    }

    pub async fn stop_monitor_mode(
        &self,
        interface: &str,
    ) -> GatewayResult<Outcome<CommandResponse>> {
        let interface = require_interface(interface)?;
        let result = self
            .post_json("/monitor/stop/", &InterfaceBody { interface })
            .await;
        self.settle(result, || {
            CommandResponse::ok(format!("Stopped monitor mode on {interface}"))
        })
    }

    // ── Scanning ──────────────────────────────────────────────────────

    /// Ask the backend to start a scan, then open the shared feed
    pub async fn start_scanning(&self, interface: &str) -> GatewayResult<Outcome<CommandResponse>> {
        let interface = require_interface(interface)?;
        let result = self.post_json("/scan/", &InterfaceBody { interface }).await;
        let outcome = self.settle(result, || {
            CommandResponse::ok(format!("Started scanning on {interface}"))
                .with_data(serde_json::json!({ "scanId": "simulated" }))
        })?;
        if outcome.value().success {
            self.hub.ensure_open();
        }
        info!("Scan requested on {} ({})", interface, self.feed_status().label());
        Ok(outcome)
    }

    /// Tear down the feed. Safe to call when nothing is running.
    pub fn stop_scanning(&self) {
        if self.hub.close() {
            info!("Scanning stopped");
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ScanResult) + Send + Sync + 'static,
    {
        self.hub.subscribe(listener)
    }

    // ── Attacks ───────────────────────────────────────────────────────

    pub async fn deauth_attack(
        &self,
        request: &DeauthRequest,
    ) -> GatewayResult<Outcome<CommandResponse>> {
        request.validate()?;
        let result = self.post_json("/attack/deauth/", &request.body()).await;
        self.settle(result, || CommandResponse::ok(request.describe()))
    }

    // ── Status ────────────────────────────────────────────────────────

    pub async fn status(&self) -> GatewayResult<Outcome<ServerStatus>> {
        let result = self.get_json("/status/").await;
        self.settle(result, ServerStatus::unknown)
    }

    // ── Transport ─────────────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        if self.mode == BackendMode::Demo {
            return Err(demo_error(path));
        }
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        decode(url, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        if self.mode == BackendMode::Demo {
            return Err(demo_error(path));
        }
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        decode(url, response).await
    }

    /// Apply the backend mode to a transport result
    fn settle<T>(
        &self,
        result: GatewayResult<T>,
        fallback: impl FnOnce() -> T,
    ) -> GatewayResult<Outcome<T>> {
        match result {
            Ok(value) => Ok(Outcome::Live(value)),
            Err(e) if self.mode == BackendMode::Live || !e.is_transport() => Err(e),
            Err(e) => {
                if self.mode == BackendMode::Auto {
                    warn!("Backend unavailable, using simulated response: {}", e);
                }
                Ok(Outcome::Simulated {
                    value: fallback(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: String,
    response: reqwest::Response,
) -> GatewayResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status { endpoint, status });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn demo_error(path: &str) -> GatewayError {
    GatewayError::Status {
        endpoint: format!("demo:{path}"),
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn require_interface(interface: &str) -> GatewayResult<&str> {
    let trimmed = interface.trim();
    if trimmed.is_empty() {
        Err(GatewayError::InvalidInput("interface name is empty".into()))
    } else {
        Ok(trimmed)
    }
}

/// Adapters shown when the backend cannot enumerate real ones
pub fn fallback_interfaces() -> Vec<WifiInterface> {
    vec![
        WifiInterface::new("wlan0", "iwlwifi", "Intel Corporation", InterfaceMode::Normal),
        WifiInterface::new("wlan1", "rtl8812au", "Realtek", InterfaceMode::Normal),
        WifiInterface::new("mon0", "rtl8812au", "Realtek", InterfaceMode::Monitor),
    ]
}
