//! Scan update distribution.
//!
//! A [`ScanHub`] owns the listener list and at most one pump task driving a
//! [`ScanSource`]. The source is opened when the first listener arrives (or
//! on [`ScanHub::ensure_open`]) and torn down when the last listener leaves
//! or [`ScanHub::close`] is called.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::simulator::{Simulator, SimulatorSettings};
use super::types::{FeedMessage, ScanResult};
use crate::error::{GatewayError, GatewayResult};

/// Where scan batches are currently coming from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Connecting,
    Live,
    Simulated,
    Failed(String),
}

impl FeedStatus {
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Live => "live",
            Self::Simulated => "SIMULATED",
            Self::Failed(_) => "failed",
        }
    }
}

/// An opened source: a lazy sequence of batches plus what it represents
pub struct ScanFeed {
    pub status: FeedStatus,
    pub batches: BoxStream<'static, ScanResult>,
}

/// Anything that can produce a stream of scan batches
#[async_trait]
pub trait ScanSource: Send + Sync {
    async fn open(&self) -> GatewayResult<ScanFeed>;
}

// ── WebSocket source ──────────────────────────────────────────────────

/// Streams `scan_update` messages from the backend's `/ws/scan/` endpoint
pub struct WebSocketSource {
    url: String,
    /// Bound on connect, upgrade and subscribe together
    connect_timeout: Duration,
}

impl WebSocketSource {
    pub fn new(ws_base: &str, connect_timeout: Duration) -> Self {
        Self {
            url: format!("{}/scan/", ws_base.trim_end_matches('/')),
            connect_timeout,
        }
    }

    #[cfg(test)]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ScanSource for WebSocketSource {
    async fn open(&self) -> GatewayResult<ScanFeed> {
        let handshake = async {
            let (mut socket, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
            socket
                .send(Message::Text(r#"{"message":"subscribe"}"#.into()))
                .await?;
            Ok::<_, GatewayError>(socket)
        };
        let socket = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| GatewayError::Timeout {
                endpoint: self.url.clone(),
                after: self.connect_timeout,
            })??;
        info!("Scan feed connected to {}", self.url);

        let batches = socket
            .take_while(|msg| {
                let keep = match msg {
                    Ok(Message::Close(_)) => false,
                    Ok(_) => true,
                    Err(e) => {
                        warn!("Scan feed error: {}", e);
                        false
                    }
                };
                futures::future::ready(keep)
            })
            .filter_map(|msg| futures::future::ready(msg.ok().and_then(decode_message)));

        Ok(ScanFeed {
            status: FeedStatus::Live,
            batches: batches.boxed(),
        })
    }
}

/// Decode one WebSocket frame; malformed payloads are logged and dropped
fn decode_message(msg: Message) -> Option<ScanResult> {
    let text = match msg {
        Message::Text(text) => text,
        Message::Binary(bytes) => String::from_utf8(bytes).ok()?,
        _ => return None,
    };
    match serde_json::from_str::<FeedMessage>(&text) {
        Ok(FeedMessage::ScanUpdate { networks, clients }) => Some(ScanResult { networks, clients }),
        Ok(FeedMessage::Other) => None,
        Err(e) => {
            warn!("Dropping malformed scan payload: {}", e);
            None
        }
    }
}

// ── Simulated source ──────────────────────────────────────────────────

/// Emits synthetic batches on a fixed interval; the first one immediately
pub struct SimulatedSource {
    interval: Duration,
    settings: SimulatorSettings,
}

impl SimulatedSource {
    pub fn new(interval: Duration, settings: SimulatorSettings) -> Self {
        Self { interval, settings }
    }
}

#[async_trait]
impl ScanSource for SimulatedSource {
    async fn open(&self) -> GatewayResult<ScanFeed> {
        let sim = Simulator::new(self.settings.clone());
        let ticker = tokio::time::interval(self.interval);
        let batches = stream::unfold((sim, ticker), |(mut sim, mut ticker)| async move {
            ticker.tick().await;
            let batch = sim.step();
            Some((batch, (sim, ticker)))
        });
        debug!("Simulated scan feed opened ({:?} interval)", self.interval);
        Ok(ScanFeed {
            status: FeedStatus::Simulated,
            batches: batches.boxed(),
        })
    }
}

// ── Fallback source ───────────────────────────────────────────────────

/// Tries `primary`; if it cannot be opened, opens `secondary` instead
pub struct FallbackSource {
    primary: Arc<dyn ScanSource>,
    secondary: Arc<dyn ScanSource>,
}

impl FallbackSource {
    pub fn new(primary: Arc<dyn ScanSource>, secondary: Arc<dyn ScanSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl ScanSource for FallbackSource {
    async fn open(&self) -> GatewayResult<ScanFeed> {
        match self.primary.open().await {
            Ok(feed) => Ok(feed),
            Err(e) => {
                warn!("Scan feed unavailable ({}), using simulated data", e);
                self.secondary.open().await
            }
        }
    }
}

// ── Hub ───────────────────────────────────────────────────────────────

pub type Listener = Arc<dyn Fn(&ScanResult) + Send + Sync>;

struct HubState {
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
    pump: Option<JoinHandle<()>>,
    /// Bumped on every open/close; a pump only dispatches for its own epoch
    epoch: u64,
    status: FeedStatus,
    teardowns: u64,
}

impl HubState {
    fn close_feed(&mut self) -> bool {
        match self.pump.take() {
            Some(handle) => {
                self.epoch += 1;
                handle.abort();
                self.status = FeedStatus::Idle;
                self.teardowns += 1;
                true
            }
            None => false,
        }
    }
}

fn lock(state: &Mutex<HubState>) -> MutexGuard<'_, HubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reference-counted fan-out of scan batches to registered listeners.
///
/// Listeners run while the hub lock is held, so they must not call back
/// into the hub. Forward into a channel instead.
#[derive(Clone)]
pub struct ScanHub {
    state: Arc<Mutex<HubState>>,
    source: Arc<dyn ScanSource>,
}

impl ScanHub {
    pub fn new(source: Arc<dyn ScanSource>) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                listeners: Vec::new(),
                next_id: 0,
                pump: None,
                epoch: 0,
                status: FeedStatus::Idle,
                teardowns: 0,
            })),
            source,
        }
    }

    /// Register a listener; the first one opens the feed
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ScanResult) + Send + Sync + 'static,
    {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        debug!("Scan listener {} registered ({} total)", id, state.listeners.len());
        if state.listeners.len() == 1 {
            self.open_feed(&mut state);
        }
        Subscription {
            id,
            state: Some(Arc::downgrade(&self.state)),
        }
    }

    /// Open the feed if it is not already running
    pub fn ensure_open(&self) {
        let mut state = lock(&self.state);
        self.open_feed(&mut state);
    }

    /// Tear down the feed. Listeners stay registered. Returns whether
    /// anything was running.
    pub fn close(&self) -> bool {
        let closed = lock(&self.state).close_feed();
        if closed {
            info!("Scan feed closed");
        }
        closed
    }

    pub fn status(&self) -> FeedStatus {
        lock(&self.state).status.clone()
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        lock(&self.state).pump.is_some()
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    /// How many times a running feed has been torn down
    #[cfg(test)]
    pub fn teardowns(&self) -> u64 {
        lock(&self.state).teardowns
    }

    fn open_feed(&self, state: &mut HubState) {
        if state.pump.is_some() {
            return;
        }
        state.epoch += 1;
        state.status = FeedStatus::Connecting;
        let epoch = state.epoch;
        let shared = Arc::clone(&self.state);
        let source = Arc::clone(&self.source);

        state.pump = Some(tokio::spawn(async move {
            let mut feed = match source.open().await {
                Ok(feed) => feed,
                Err(e) => {
                    warn!("Scan feed failed to open: {}", e);
                    let mut state = lock(&shared);
                    if state.epoch == epoch {
                        state.pump = None;
                        state.status = FeedStatus::Failed(e.to_string());
                    }
                    return;
                }
            };

            {
                let mut state = lock(&shared);
                if state.epoch != epoch {
                    return;
                }
                state.status = feed.status.clone();
            }

            while let Some(batch) = feed.batches.next().await {
                let state = lock(&shared);
                if state.epoch != epoch {
                    return;
                }
                for (_, listener) in &state.listeners {
                    listener(&batch);
                }
            }

            debug!("Scan feed ended");
            let mut state = lock(&shared);
            if state.epoch == epoch {
                state.pump = None;
                state.status = FeedStatus::Idle;
            }
        }));
    }
}

/// Handle returned by [`ScanHub::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    state: Option<Weak<Mutex<HubState>>>,
}

impl Subscription {
    /// Remove the listener. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        let Some(weak) = self.state.take() else {
            return;
        };
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut state = lock(&shared);
        state.listeners.retain(|(id, _)| *id != self.id);
        if state.listeners.is_empty() && state.close_feed() {
            info!("Last scan listener left, feed closed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::Network;
    use futures::channel::mpsc as fmpsc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Source fed by the test through a channel; counts closed streams
    struct ChannelSource {
        rx: Mutex<Option<fmpsc::UnboundedReceiver<ScanResult>>>,
        opens: AtomicUsize,
        closes: Arc<AtomicUsize>,
    }

    struct CloseGuard(Arc<AtomicUsize>);

    impl Drop for CloseGuard {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl ChannelSource {
        fn new() -> (Arc<Self>, fmpsc::UnboundedSender<ScanResult>) {
            let (tx, rx) = fmpsc::unbounded();
            let src = Arc::new(Self {
                rx: Mutex::new(Some(rx)),
                opens: AtomicUsize::new(0),
                closes: Arc::new(AtomicUsize::new(0)),
            });
            (src, tx)
        }
    }

    #[async_trait]
    impl ScanSource for ChannelSource {
        async fn open(&self) -> GatewayResult<ScanFeed> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let rx = self.rx.lock().unwrap().take().expect("opened twice");
            let guard = CloseGuard(Arc::clone(&self.closes));
            let batches = rx.map(move |b| {
                let _ = &guard;
                b
            });
            Ok(ScanFeed {
                status: FeedStatus::Live,
                batches: batches.boxed(),
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ScanSource for FailingSource {
        async fn open(&self) -> GatewayResult<ScanFeed> {
            Err(GatewayError::InvalidInput("unreachable".into()))
        }
    }

    fn batch_with(ssid: &str) -> ScanResult {
        let now = chrono::Utc::now();
        ScanResult {
            networks: vec![Network {
                id: "1".into(),
                ssid: ssid.into(),
                bssid: "00:11:22:33:44:55".into(),
                channel: 6,
                signal: 50,
                encryption: crate::backend::types::Encryption::Wpa2,
                vendor: "Netgear".into(),
                clients: 0,
                first_seen: now,
                last_seen: now,
            }],
            clients: vec![],
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_listeners_called_once_in_registration_order() {
        let (source, tx) = ChannelSource::new();
        let hub = ScanHub::new(source.clone());
        let (order_tx, mut order_rx) = mpsc::unbounded_channel();

        let first_tx = order_tx.clone();
        let _a = hub.subscribe(move |_| {
            let _ = first_tx.send("first");
        });
        let second_tx = order_tx.clone();
        let _b = hub.subscribe(move |_| {
            let _ = second_tx.send("second");
        });

        tx.unbounded_send(batch_with("HomeWiFi")).unwrap();
        assert_eq!(order_rx.recv().await, Some("first"));
        assert_eq!(order_rx.recv().await, Some("second"));
        settle().await;
        assert!(order_rx.try_recv().is_err());
        assert_eq!(source.opens.load(Ordering::SeqCst), 1);
        assert_eq!(hub.status(), FeedStatus::Live);
    }

    #[tokio::test]
    async fn test_unsubscribing_all_tears_down_exactly_once() {
        let (source, _tx) = ChannelSource::new();
        let hub = ScanHub::new(source.clone());

        let mut a = hub.subscribe(|_| {});
        let mut b = hub.subscribe(|_| {});
        settle().await;
        assert!(hub.is_open());

        a.unsubscribe();
        assert!(hub.is_open());
        b.unsubscribe();
        b.unsubscribe();
        a.unsubscribe();
        drop(a);
        drop(b);
        settle().await;

        assert!(!hub.is_open());
        assert_eq!(hub.teardowns(), 1);
        assert_eq!(source.closes.load(Ordering::SeqCst), 1);
        assert_eq!(hub.status(), FeedStatus::Idle);
    }

    #[tokio::test]
    async fn test_no_delivery_after_close() {
        let (source, tx) = ChannelSource::new();
        let hub = ScanHub::new(source);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = hub.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.unbounded_send(batch_with("a")).unwrap();
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(hub.close());
        assert!(!hub.close());
        let _ = tx.unbounded_send(batch_with("b"));
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(hub.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_open_is_idempotent() {
        let (source, _tx) = ChannelSource::new();
        let hub = ScanHub::new(source.clone());
        hub.ensure_open();
        hub.ensure_open();
        let _sub = hub.subscribe(|_| {});
        settle().await;
        assert_eq!(source.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_open_reports_status() {
        let hub = ScanHub::new(Arc::new(FailingSource));
        let _sub = hub.subscribe(|_| {});
        settle().await;
        assert!(matches!(hub.status(), FeedStatus::Failed(_)));
        assert!(!hub.is_open());
    }

    #[tokio::test]
    async fn test_fallback_source_switches_to_simulator() {
        let fallback = FallbackSource::new(
            Arc::new(FailingSource),
            Arc::new(SimulatedSource::new(
                Duration::from_millis(20),
                SimulatorSettings {
                    seed: Some(5),
                    ..Default::default()
                },
            )),
        );
        let hub = ScanHub::new(Arc::new(fallback));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = hub.subscribe(move |batch| {
            let _ = tx.send(batch.networks.len());
        });
        let count = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(count, 5);
        assert_eq!(hub.status(), FeedStatus::Simulated);
    }

    /// Accepts TCP connections and never answers the upgrade
    async fn silent_listener() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("ws://{addr}/ws")
    }

    #[tokio::test]
    async fn test_stalled_handshake_times_out() {
        let source = WebSocketSource::new(&silent_listener().await, Duration::from_millis(100));
        let err = tokio::time::timeout(Duration::from_secs(2), source.open())
            .await
            .expect("open should give up on its own")
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::Timeout { .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_stalled_backend_falls_back_to_simulator() {
        let fallback = FallbackSource::new(
            Arc::new(WebSocketSource::new(
                &silent_listener().await,
                Duration::from_millis(100),
            )),
            Arc::new(SimulatedSource::new(
                Duration::from_millis(50),
                SimulatorSettings {
                    seed: Some(2),
                    ..Default::default()
                },
            )),
        );
        let hub = ScanHub::new(Arc::new(fallback));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = hub.subscribe(move |batch| {
            let _ = tx.send(batch.networks.len());
        });
        let count = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(count >= 5);
        assert_eq!(hub.status(), FeedStatus::Simulated);
    }

    #[test]
    fn test_decode_message_skips_garbage() {
        assert!(decode_message(Message::Text("not json".into())).is_none());
        assert!(decode_message(Message::Text(r#"{"type":"ping"}"#.into())).is_none());
        let batch = decode_message(Message::Text(
            r#"{"type":"scan_update","networks":[],"clients":[]}"#.into(),
        ));
        assert_eq!(batch, Some(ScanResult::default()));
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(
            WebSocketSource::new("ws://localhost:5000/ws/", Duration::from_secs(1)).url(),
            "ws://localhost:5000/ws/scan/"
        );
    }
}
