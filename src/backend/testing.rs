//! In-process stand-in for the reconnaissance backend, used by tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
struct FakeState {
    deauth: Mutex<Option<Value>>,
    scans: AtomicUsize,
}

pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/api/interfaces/", get(interfaces))
            .route("/api/monitor/start/", post(monitor_start))
            .route("/api/monitor/stop/", post(monitor_stop))
            .route("/api/scan/", post(scan))
            .route("/api/attack/deauth/", post(deauth))
            .route("/api/status/", get(status))
            .route("/ws/scan/", get(ws_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, state }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn last_deauth(&self) -> Option<Value> {
        self.state.deauth.lock().unwrap().clone()
    }

    pub fn scan_requests(&self) -> usize {
        self.state.scans.load(Ordering::SeqCst)
    }
}

async fn interfaces() -> Json<Value> {
    Json(json!([
        {"name": "wlan0", "driver": "ath9k", "chipset": "Atheros AR9271", "status": "normal"}
    ]))
}

async fn monitor_start(Json(body): Json<Value>) -> Json<Value> {
    let iface = body["interface"].as_str().unwrap_or_default();
    Json(json!({
        "success": true,
        "message": format!("Monitor mode enabled on {iface}"),
        "data": {"monitorInterface": format!("{iface}mon")}
    }))
}

async fn monitor_stop() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn scan(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state.scans.fetch_add(1, Ordering::SeqCst);
    Json(json!({"success": true, "message": "Scan started", "data": {"scanId": "abc123"}}))
}

async fn deauth(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    *state.deauth.lock().unwrap() = Some(body);
    Json(json!({"success": true, "message": "Deauth started"}))
}

async fn status() -> Json<Value> {
    Json(json!({"status": "running", "activeProcesses": 1, "version": "1.0.0"}))
}

async fn ws_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_socket)
}

/// Waits for the subscribe handshake, pushes one update, then idles until closed
async fn handle_socket(mut socket: WebSocket) {
    match socket.recv().await {
        Some(Ok(Message::Text(text))) if text.contains("subscribe") => {}
        _ => return,
    }

    let update = json!({
        "type": "scan_update",
        "networks": [{
            "id": "1", "ssid": "HomeWiFi", "bssid": "00:11:22:33:44:55", "channel": 6,
            "signal": 85, "encryption": "WPA2", "vendor": "Netgear", "clients": 1,
            "firstSeen": 1700000000000i64, "lastSeen": 1700000000000i64
        }],
        "clients": [{
            "mac": "DE:AD:BE:EF:00:01", "bssid": "00:11:22:33:44:55", "power": 60,
            "rate": "54-54", "lost": 0, "frames": 100, "probe": [],
            "firstSeen": 1700000000000i64, "lastSeen": 1700000000000i64
        }]
    });
    let noise = json!({"type": "interface_update", "message": "changed"});

    for frame in [noise, update] {
        if socket.send(Message::Text(frame.to_string())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(msg)) = socket.recv().await {
        if matches!(msg, Message::Close(_)) {
            break;
        }
    }
}
