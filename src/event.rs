use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::attack::DeauthRequest;
use crate::backend::types::CommandResponse;
use crate::backend::{FeedStatus, Outcome, ScanResult, ServerStatus, WifiInterface};

/// Requests from the UI to the gateway, executed by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCommand {
    RefreshInterfaces,
    RefreshStatus,
    StartMonitor(String),
    StopMonitor(String),
    StartScan(String),
    StopScan,
    Deauth(DeauthRequest),
}

/// Application-level events
#[derive(Debug, Clone)]
pub enum Event {
    /// User key press
    Key(KeyEvent),
    /// Animation / render tick
    Tick,
    /// Terminal resize; the next draw picks up the new size
    Resize,
    /// A command issued by the UI (handled by the main loop)
    Command(GatewayCommand),
    /// One batch from the scan feed
    ScanBatch(ScanResult),
    FeedChanged(FeedStatus),
    Interfaces(Outcome<Vec<WifiInterface>>),
    Status(Outcome<ServerStatus>),
    Monitor {
        interface: String,
        enable: bool,
        outcome: Outcome<CommandResponse>,
    },
    ScanStarted {
        interface: String,
        outcome: Outcome<CommandResponse>,
    },
    AttackAck {
        request: DeauthRequest,
        outcome: Outcome<CommandResponse>,
    },
    /// The backend refused or never received the attack
    AttackFailed(String),
    /// The scan request itself failed; no feed was opened
    ScanFailed(String),
    /// A gateway call failed outright
    Error(String),
}

/// Collects terminal input and ticks into one channel.
///
/// Uses crossterm's async `EventStream` so no tokio worker thread is blocked.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
    stop: Arc<AtomicBool>,
}

impl EventHandler {
    /// Spawns the input reader and the tick generator.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        let input_tx = tx.clone();
        let input_stop = stop.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            loop {
                let maybe_event = reader.next().await;
                if input_stop.load(Ordering::Relaxed) {
                    return;
                }
                match maybe_event {
                    Some(Ok(CrosstermEvent::Key(key))) => {
                        if key.kind == KeyEventKind::Press
                            && input_tx.send(Event::Key(key)).is_err()
                        {
                            return;
                        }
                    }
                    Some(Ok(CrosstermEvent::Resize(_, _))) => {
                        if input_tx.send(Event::Resize).is_err() {
                            return;
                        }
                    }
                    Some(Err(_)) | None => return,
                    _ => {}
                }
            }
        });

        let tick_tx = tx.clone();
        let tick_stop = stop.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tick_stop.load(Ordering::Relaxed) || tick_tx.send(Event::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx, stop }
    }

    /// Sender for pollers, the dispatcher and the app
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Signal the background tasks to stop
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
