//! Node/link layout for the topology chart.
//!
//! Coordinates are in an abstract canvas space with the origin top-left.
//! The renderer scales them to the terminal.

use std::f64::consts::TAU;

use crate::backend::{Client, Encryption, Network};

const LABEL_LEN: usize = 12;
const CLIENT_RADIUS: f64 = 6.0;
const STRAY_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    AccessPoint(Encryption),
    Client,
    Unassociated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    /// 0-100, drives line brightness
    pub strength: u8,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// FNV-1a, so positions stay put from one frame to the next
fn stable_hash(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn truncate(label: &str) -> String {
    label.chars().take(LABEL_LEN).collect()
}

pub fn layout(width: f64, height: f64, networks: &[Network], clients: &[Client]) -> Topology {
    let mut topo = Topology::default();
    if networks.is_empty() && clients.is_empty() {
        return topo;
    }

    let ring = width.min(height) * 0.3;
    let (cx, cy) = (width / 2.0, height / 2.0);
    let count = networks.len().max(1) as f64;

    for (i, net) in networks.iter().enumerate() {
        let angle = i as f64 / count * TAU;
        let label = if net.is_hidden() {
            format!("Hidden ({})", net.bssid)
        } else {
            net.ssid.clone()
        };
        topo.nodes.push(Node {
            id: net.bssid.clone(),
            label: truncate(&label),
            x: cx + ring * angle.cos(),
            y: cy + ring * angle.sin(),
            radius: 12.0 + f64::from(net.signal) / 10.0,
            kind: NodeKind::AccessPoint(net.encryption),
        });
    }

    let mut strays = 0usize;
    for client in clients {
        let ap = client
            .associated_bssid()
            .and_then(|bssid| topo.nodes[..networks.len()].iter().position(|n| n.id == bssid));

        match ap {
            Some(ap_index) => {
                let hash = stable_hash(&client.mac);
                let angle = (hash % 3600) as f64 / 3600.0 * TAU;
                let distance = 40.0 + ((hash >> 16) % 300) as f64 / 10.0;
                let (ax, ay) = (topo.nodes[ap_index].x, topo.nodes[ap_index].y);
                topo.nodes.push(Node {
                    id: client.mac.clone(),
                    label: truncate(&client.mac),
                    x: ax + distance * angle.cos(),
                    y: ay + distance * angle.sin(),
                    radius: CLIENT_RADIUS,
                    kind: NodeKind::Client,
                });
                topo.links.push(Link {
                    from: ap_index,
                    to: topo.nodes.len() - 1,
                    strength: if client.power == 0 { 50 } else { client.power.min(100) },
                });
            }
            None => {
                topo.nodes.push(Node {
                    id: client.mac.clone(),
                    label: truncate(&client.mac),
                    x: 50.0 + (width - 100.0) * (strays % 5) as f64 / 5.0,
                    y: height - 50.0,
                    radius: STRAY_RADIUS,
                    kind: NodeKind::Unassociated,
                });
                strays += 1;
            }
        }
    }

    topo
}
