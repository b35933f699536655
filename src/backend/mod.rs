pub mod feed;
pub mod gateway;
pub mod simulator;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use feed::{FeedStatus, Subscription};
pub use gateway::{BackendMode, Gateway, GatewaySettings, Outcome};
pub use types::{
    Client, Encryption, InterfaceMode, Network, ScanResult, ServerStatus, WifiInterface,
};
