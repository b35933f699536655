use std::collections::{HashMap, HashSet};

use crate::backend::{Client, Network, ScanResult};

/// Something the search box can match against
pub trait Searchable {
    fn matches(&self, needle: &str) -> bool;
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Searchable for Network {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.ssid, needle)
            || contains(&self.bssid, needle)
            || contains(&self.vendor, needle)
    }
}

impl Searchable for Client {
    fn matches(&self, needle: &str) -> bool {
        contains(&self.mac, needle)
            || contains(&self.bssid, needle)
            || self.vendor.as_deref().is_some_and(|v| contains(v, needle))
            || self.probe.iter().any(|p| contains(p, needle))
    }
}

/// Case-insensitive substring filter. Blank terms match everything.
pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.matches(&needle)).collect()
}

/// Records seen for the first time in a batch
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Discoveries {
    pub networks: Vec<Network>,
    pub clients: Vec<Client>,
}

impl Discoveries {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty() && self.clients.is_empty()
    }
}

/// Latest known networks and clients for the current scan
#[derive(Debug, Default)]
pub struct ScanSession {
    networks: Vec<Network>,
    clients: Vec<Client>,
    batches: u64,
}

impl ScanSession {
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn network(&self, bssid: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.bssid == bssid)
    }

    /// Clients currently associated with `bssid`
    pub fn clients_of<'a>(&'a self, bssid: &'a str) -> impl Iterator<Item = &'a Client> + 'a {
        self.clients
            .iter()
            .filter(move |c| c.associated_bssid() == Some(bssid))
    }

    /// Replace both collections with the batch. A record never moves
    /// backwards in time: `last_seen` keeps the later of old and new.
    pub fn apply(&mut self, batch: ScanResult) -> Discoveries {
        let old_networks: HashMap<&str, &Network> = self
            .networks
            .iter()
            .map(|n| (n.bssid.as_str(), n))
            .collect();
        let old_clients: HashMap<&str, &Client> =
            self.clients.iter().map(|c| (c.mac.as_str(), c)).collect();

        let mut discoveries = Discoveries::default();
        let mut seen = HashSet::new();
        let mut networks = Vec::with_capacity(batch.networks.len());
        for mut net in batch.networks {
            if !seen.insert(net.bssid.clone()) {
                continue;
            }
            match old_networks.get(net.bssid.as_str()) {
                Some(prev) => net.last_seen = net.last_seen.max(prev.last_seen),
                None => discoveries.networks.push(net.clone()),
            }
            networks.push(net);
        }

        seen.clear();
        let mut clients = Vec::with_capacity(batch.clients.len());
        for mut client in batch.clients {
            if !seen.insert(client.mac.clone()) {
                continue;
            }
            match old_clients.get(client.mac.as_str()) {
                Some(prev) => client.last_seen = client.last_seen.max(prev.last_seen),
                None => discoveries.clients.push(client.clone()),
            }
            clients.push(client);
        }

        self.networks = networks;
        self.clients = clients;
        self.batches += 1;
        discoveries
    }

    /// Drop everything at the start of a new scan
    pub fn clear(&mut self) {
        self.networks.clear();
        self.clients.clear();
        self.batches = 0;
    }
}
