use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::backend::{FeedStatus, Gateway, ScanResult, Subscription};
use crate::event::{Event, GatewayCommand};

#[derive(Default)]
struct ScanSlot {
    generation: u64,
    subscription: Option<Subscription>,
}

/// Runs gateway commands off the UI thread and reports back through events.
///
/// Owns the scan subscription: batches are forwarded into the event channel
/// while a scan is running.
pub struct Dispatcher {
    gateway: Arc<Gateway>,
    tx: UnboundedSender<Event>,
    scan: Arc<Mutex<ScanSlot>>,
    generation: Arc<AtomicU64>,
    last_feed: FeedStatus,
}

impl Dispatcher {
    pub fn new(gateway: Arc<Gateway>, tx: UnboundedSender<Event>) -> Self {
        Self {
            gateway,
            tx,
            scan: Arc::new(Mutex::new(ScanSlot::default())),
            generation: Arc::new(AtomicU64::new(0)),
            last_feed: FeedStatus::Idle,
        }
    }

    pub fn handle(&mut self, command: GatewayCommand) {
        debug!("Dispatching {:?}", command);
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();

        match command {
            GatewayCommand::RefreshInterfaces => {
                tokio::spawn(async move {
                    let event = match gateway.list_interfaces().await {
                        Ok(outcome) => Event::Interfaces(outcome),
                        Err(e) => Event::Error(format!("Failed to list interfaces: {e}")),
                    };
                    let _ = tx.send(event);
                });
            }
            GatewayCommand::RefreshStatus => {
                tokio::spawn(async move {
                    let event = match gateway.status().await {
                        Ok(outcome) => Event::Status(outcome),
                        Err(e) => Event::Error(format!("Failed to fetch server status: {e}")),
                    };
                    let _ = tx.send(event);
                });
            }
            GatewayCommand::StartMonitor(interface) => {
                tokio::spawn(async move {
                    let event = match gateway.start_monitor_mode(&interface).await {
                        Ok(outcome) => Event::Monitor { interface, enable: true, outcome },
                        Err(e) => Event::Error(format!("Failed to start monitor mode: {e}")),
                    };
                    let _ = tx.send(event);
                });
            }
            GatewayCommand::StopMonitor(interface) => {
                tokio::spawn(async move {
                    let event = match gateway.stop_monitor_mode(&interface).await {
                        Ok(outcome) => Event::Monitor { interface, enable: false, outcome },
                        Err(e) => Event::Error(format!("Failed to stop monitor mode: {e}")),
                    };
                    let _ = tx.send(event);
                });
            }
            GatewayCommand::StartScan(interface) => self.start_scan(interface),
            GatewayCommand::StopScan => self.stop_scan(),
            GatewayCommand::Deauth(request) => {
                tokio::spawn(async move {
                    let event = match gateway.deauth_attack(&request).await {
                        Ok(outcome) => Event::AttackAck { request, outcome },
                        Err(e) => Event::AttackFailed(format!("Attack failed: {e}")),
                    };
                    let _ = tx.send(event);
                });
            }
        }
    }

    fn start_scan(&mut self, interface: String) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let slot = Arc::clone(&self.scan);
        let generation = self.generation.load(Ordering::SeqCst);

        tokio::spawn(async move {
            let outcome = match gateway.start_scanning(&interface).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let _ = tx.send(Event::ScanFailed(format!("Failed to start scan: {e}")));
                    return;
                }
            };

            if outcome.value().success {
                let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                // A stop issued while the request was in flight wins
                if slot.generation != generation {
                    if slot.subscription.is_none() {
                        gateway.stop_scanning();
                    }
                    return;
                }
                if slot.subscription.is_none() {
                    let forward = tx.clone();
                    slot.subscription = Some(gateway.subscribe(move |batch: &ScanResult| {
                        let _ = forward.send(Event::ScanBatch(batch.clone()));
                    }));
                }
            }
            let _ = tx.send(Event::ScanStarted { interface, outcome });
        });
    }

    fn stop_scan(&mut self) {
        let previous = {
            let mut slot = self.scan.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            slot.subscription.take()
        };
        if let Some(mut subscription) = previous {
            subscription.unsubscribe();
        }
        self.gateway.stop_scanning();
    }

    #[cfg(test)]
    pub fn is_streaming(&self) -> bool {
        self.scan
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscription
            .is_some()
    }

    /// Report feed status transitions; called on every tick
    pub fn poll_feed_status(&mut self) {
        let current = self.gateway.feed_status();
        if current != self.last_feed {
            if let FeedStatus::Failed(ref reason) = current {
                warn!("Scan feed failed: {}", reason);
            }
            self.last_feed = current.clone();
            let _ = self.tx.send(Event::FeedChanged(current));
        }
    }

    pub fn shutdown(&mut self) {
        self.stop_scan();
    }
}
