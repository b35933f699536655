//! Synthetic scan data for demo mode and for running without a backend.
//!
//! Everything produced here is fake. Callers surface that through
//! `FeedStatus::Simulated` / `Outcome::Simulated`.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::types::{Client, Encryption, Network, ScanResult, NOT_ASSOCIATED};

const SIGNAL_JITTER: i16 = 5;
const SIGNAL_MIN: i16 = 1;
const SIGNAL_MAX: i16 = 100;

const NEW_NETWORK_CHANCE: f64 = 0.25;
const NEW_CLIENT_CHANCE: f64 = 0.35;

const SSID_POOL: &[&str] = &[
    "Linksys", "NETGEAR-5G", "xfinitywifi", "CoffeeShop", "Airport_Free",
    "DIRECT-printer", "IoT-Hub", "Lab-Net", "SKY-8842", "eduroam", "",
];

const VENDOR_POOL: &[&str] = &[
    "Netgear", "Cisco", "TP-Link", "Linksys", "D-Link", "Ubiquiti", "Aruba", "Asus",
];

const CLIENT_VENDOR_POOL: &[&str] = &[
    "Apple", "Samsung", "Intel", "Google", "Xiaomi", "Espressif", "Huawei",
];

const RATE_POOL: &[&str] = &["0-1", "1e-1", "6e-6", "24-1", "54e-54"];

/// Bounds and seed for the generator
#[derive(Debug, Clone)]
pub struct SimulatorSettings {
    pub seed: Option<u64>,
    pub max_networks: usize,
    pub max_clients: usize,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            seed: None,
            max_networks: 24,
            max_clients: 40,
        }
    }
}

/// Mutable synthetic scan state, advanced one step per interval
pub struct Simulator {
    rng: StdRng,
    settings: SimulatorSettings,
    networks: Vec<Network>,
    clients: Vec<Client>,
    next_id: u32,
    started: bool,
}

impl Simulator {
    pub fn new(settings: SimulatorSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = Utc::now();
        let networks = seed_networks(now);
        let clients = seed_clients(now);
        let next_id = networks.len() as u32 + 1;
        let mut sim = Self {
            rng,
            settings,
            networks,
            clients,
            next_id,
            started: false,
        };
        sim.recount_clients();
        sim
    }

    /// Produce the next batch. The first call returns the initial records
    /// untouched; later calls jitter, refresh and occasionally discover.
    pub fn step(&mut self) -> ScanResult {
        self.step_at(Utc::now())
    }

    pub fn step_at(&mut self, now: DateTime<Utc>) -> ScanResult {
        if self.started {
            self.jitter(now);
            self.maybe_discover(now);
            self.recount_clients();
        }
        self.started = true;
        self.snapshot()
    }

    pub fn snapshot(&self) -> ScanResult {
        ScanResult {
            networks: self.networks.clone(),
            clients: self.clients.clone(),
        }
    }

    fn jitter(&mut self, now: DateTime<Utc>) {
        for net in &mut self.networks {
            let delta = self.rng.gen_range(-SIGNAL_JITTER..=SIGNAL_JITTER);
            net.signal = clamp_signal(net.signal as i16 + delta);
            net.last_seen = now;
        }
        for client in &mut self.clients {
            let delta = self.rng.gen_range(-SIGNAL_JITTER..=SIGNAL_JITTER);
            client.power = clamp_signal(client.power as i16 + delta);
            client.frames = client.frames.saturating_add(self.rng.gen_range(0..40));
            if self.rng.gen_bool(0.1) {
                client.lost = client.lost.saturating_add(1);
            }
            client.last_seen = now;
        }
    }

    fn maybe_discover(&mut self, now: DateTime<Utc>) {
        if self.networks.len() < self.settings.max_networks
            && self.rng.gen_bool(NEW_NETWORK_CHANCE)
        {
            let net = self.random_network(now);
            self.networks.push(net);
        }
        if self.clients.len() < self.settings.max_clients && self.rng.gen_bool(NEW_CLIENT_CHANCE) {
            let client = self.random_client(now);
            self.clients.push(client);
        }
    }

    fn random_network(&mut self, now: DateTime<Utc>) -> Network {
        let id = self.next_id;
        self.next_id += 1;
        let bssid = loop {
            let candidate = random_mac(&mut self.rng);
            if !self.networks.iter().any(|n| n.bssid == candidate) {
                break candidate;
            }
        };
        let ssid = SSID_POOL.choose(&mut self.rng).copied().unwrap_or_default();
        let encryption = Encryption::all()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Encryption::Wpa2);
        let vendor = VENDOR_POOL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("Unknown");
        Network {
            id: id.to_string(),
            ssid: ssid.to_string(),
            bssid,
            channel: self.rng.gen_range(1..=13),
            signal: self.rng.gen_range(10..=90),
            encryption,
            vendor: vendor.to_string(),
            clients: 0,
            first_seen: now,
            last_seen: now,
        }
    }

    fn random_client(&mut self, now: DateTime<Utc>) -> Client {
        let mac = loop {
            let candidate = random_mac(&mut self.rng);
            if !self.clients.iter().any(|c| c.mac == candidate) {
                break candidate;
            }
        };
        let bssid = if self.rng.gen_bool(0.8) {
            self.networks
                .choose(&mut self.rng)
                .map(|n| n.bssid.clone())
                .unwrap_or_else(|| NOT_ASSOCIATED.to_string())
        } else {
            NOT_ASSOCIATED.to_string()
        };
        let probe_count = self.rng.gen_range(0..=2);
        let probe = SSID_POOL
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .choose_multiple(&mut self.rng, probe_count)
            .map(|s| s.to_string())
            .collect();
        Client {
            mac,
            bssid,
            power: self.rng.gen_range(10..=90),
            rate: RATE_POOL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or("0-0")
                .to_string(),
            lost: 0,
            frames: self.rng.gen_range(1..50),
            probe,
            vendor: CLIENT_VENDOR_POOL
                .choose(&mut self.rng)
                .map(|v| v.to_string()),
            first_seen: now,
            last_seen: now,
        }
    }

    fn recount_clients(&mut self) {
        for net in &mut self.networks {
            net.clients = self
                .clients
                .iter()
                .filter(|c| c.associated_bssid() == Some(net.bssid.as_str()))
                .count() as u32;
        }
    }
}

fn clamp_signal(value: i16) -> u8 {
    value.clamp(SIGNAL_MIN, SIGNAL_MAX) as u8
}

/// Locally administered unicast MAC
fn random_mac(rng: &mut StdRng) -> String {
    let mut octets: [u8; 6] = rng.gen();
    octets[0] = (octets[0] & 0xFE) | 0x02;
    octets
        .iter()
        .map(|o| format!("{o:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// id, ssid, bssid, channel, signal, encryption, vendor
type SeedNetwork = (&'static str, &'static str, &'static str, u16, u8, Encryption, &'static str);

const SEED_NETWORKS: [SeedNetwork; 5] = [
    ("1", "HomeWiFi", "00:11:22:33:44:55", 6, 85, Encryption::Wpa2, "Netgear"),
    ("2", "Office Network", "AA:BB:CC:DD:EE:FF", 11, 65, Encryption::Wpa3, "Cisco"),
    ("3", "Guest WiFi", "11:22:33:44:55:66", 1, 35, Encryption::Open, "TP-Link"),
    ("4", "", "66:77:88:99:AA:BB", 3, 42, Encryption::Wpa2, "Linksys"),
    ("5", "Secure Network", "CC:DD:EE:FF:00:11", 2, 78, Encryption::Wep, "D-Link"),
];

/// mac, bssid, power, vendor, probed ssids
type SeedClient = (&'static str, &'static str, u8, &'static str, &'static [&'static str]);

const SEED_CLIENTS: [SeedClient; 5] = [
    ("3C:22:FB:10:20:30", "00:11:22:33:44:55", 70, "Apple", &["HomeWiFi"]),
    ("F0:18:98:AA:BB:01", "00:11:22:33:44:55", 55, "Apple", &[]),
    ("8C:85:90:12:34:56", "AA:BB:CC:DD:EE:FF", 60, "Intel", &["Office Network"]),
    ("24:0A:C4:00:11:22", "11:22:33:44:55:66", 30, "Espressif", &[]),
    ("DA:A1:19:5E:6F:70", NOT_ASSOCIATED, 25, "Google", &["eduroam", "CoffeeShop"]),
];

fn seed_networks(now: DateTime<Utc>) -> Vec<Network> {
    SEED_NETWORKS
        .iter()
        .map(|&(id, ssid, bssid, channel, signal, encryption, vendor)| Network {
            id: id.into(),
            ssid: ssid.into(),
            bssid: bssid.into(),
            channel,
            signal,
            encryption,
            vendor: vendor.into(),
            clients: 0,
            first_seen: now,
            last_seen: now,
        })
        .collect()
}

fn seed_clients(now: DateTime<Utc>) -> Vec<Client> {
    SEED_CLIENTS
        .iter()
        .map(|&(mac, bssid, power, vendor, probe)| Client {
            mac: mac.into(),
            bssid: bssid.into(),
            power,
            rate: "54e-54".into(),
            lost: 0,
            frames: 120,
            probe: probe.iter().map(|p| p.to_string()).collect(),
            vendor: Some(vendor.into()),
            first_seen: now,
            last_seen: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> Simulator {
        Simulator::new(SimulatorSettings {
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn test_first_batch_is_seed_data() {
        let mut sim = seeded(7);
        let batch = sim.step();
        assert_eq!(batch.networks.len(), 5);
        assert_eq!(batch.networks[0].ssid, "HomeWiFi");
        assert!(batch.networks.iter().all(|n| !n.vendor.is_empty()));
        // Two seeded clients sit on HomeWiFi
        assert_eq!(batch.networks[0].clients, 2);
    }

    #[test]
    fn test_seed_tables_fill_every_field() {
        let now = Utc::now();
        let networks = seed_networks(now);
        let office = &networks[1];
        assert_eq!(office.id, "2");
        assert_eq!(office.bssid, "AA:BB:CC:DD:EE:FF");
        assert_eq!((office.channel, office.signal), (11, 65));
        assert_eq!(office.encryption, Encryption::Wpa3);
        assert_eq!(office.vendor, "Cisco");
        assert!(networks[3].ssid.is_empty());

        let clients = seed_clients(now);
        assert_eq!(clients.len(), 5);
        assert_eq!(clients[4].bssid, NOT_ASSOCIATED);
        assert_eq!(clients[4].probe, vec!["eduroam", "CoffeeShop"]);
        assert_eq!(clients[4].vendor.as_deref(), Some("Google"));
        assert!(clients
            .iter()
            .all(|c| c.first_seen == now && c.last_seen == now));
    }

    #[test]
    fn test_signals_stay_clamped() {
        let mut sim = seeded(42);
        for _ in 0..500 {
            let batch = sim.step();
            assert!(batch.networks.iter().all(|n| (1..=100).contains(&n.signal)));
            assert!(batch.clients.iter().all(|c| (1..=100).contains(&c.power)));
        }
    }

    #[test]
    fn test_growth_is_bounded_and_keys_unique() {
        let mut sim = Simulator::new(SimulatorSettings {
            seed: Some(3),
            max_networks: 8,
            max_clients: 10,
        });
        let mut last = ScanResult::default();
        for _ in 0..400 {
            last = sim.step();
        }
        assert!(last.networks.len() <= 8);
        assert!(last.clients.len() <= 10);

        let mut bssids: Vec<_> = last.networks.iter().map(|n| n.bssid.clone()).collect();
        bssids.sort();
        bssids.dedup();
        assert_eq!(bssids.len(), last.networks.len());
    }

    #[test]
    fn test_clients_reference_known_networks() {
        let mut sim = seeded(11);
        for _ in 0..100 {
            let batch = sim.step();
            for client in &batch.clients {
                if let Some(bssid) = client.associated_bssid() {
                    assert!(batch.networks.iter().any(|n| n.bssid == bssid));
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let now = Utc::now();
        let mut a = seeded(99);
        let mut b = seeded(99);
        for _ in 0..20 {
            let ba = a.step_at(now);
            let bb = b.step_at(now);
            let sa: Vec<_> = ba.networks.iter().map(|n| (&n.bssid, n.signal)).collect();
            let sb: Vec<_> = bb.networks.iter().map(|n| (&n.bssid, n.signal)).collect();
            assert_eq!(sa, sb);
            assert_eq!(ba.clients.len(), bb.clients.len());
        }
    }

    #[test]
    fn test_random_mac_is_locally_administered() {
        let mut rng = StdRng::seed_from_u64(1);
        let mac = random_mac(&mut rng);
        assert_eq!(mac.len(), 17);
        let first = u8::from_str_radix(&mac[..2], 16).unwrap();
        assert_eq!(first & 0x02, 0x02);
        assert_eq!(first & 0x01, 0);
    }
}
