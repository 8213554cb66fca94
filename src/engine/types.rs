//! Data exchanged with the simulation engine.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::telemetry::Imsi;

/// Identity and address the engine assigned to one terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalBinding {
    pub imsi: Imsi,
    pub address: Ipv4Addr,
}

/// Final statistics of one flow as exposed by the engine after the run.
///
/// Times and delay/jitter sums are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub flow_id: u32,
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    #[serde(default)]
    pub source_port: u16,
    pub destination_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: u8,
    pub tx_packets: u64,
    pub rx_packets: u64,
    #[serde(default)]
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub delay_sum: f64,
    pub jitter_sum: f64,
    pub time_first_tx: f64,
    pub time_last_rx: f64,
}

/// UDP
fn default_protocol() -> u8 {
    17
}

/// Destination address to terminal identity lookup.
///
/// When two bindings share an address the first one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressTable {
    by_address: HashMap<Ipv4Addr, Imsi>,
}

impl AddressTable {
    pub fn from_bindings(bindings: &[TerminalBinding]) -> Self {
        let mut by_address = HashMap::with_capacity(bindings.len());
        for binding in bindings {
            by_address.entry(binding.address).or_insert(binding.imsi);
        }
        Self { by_address }
    }

    pub fn lookup(&self, address: &Ipv4Addr) -> Option<Imsi> {
        self.by_address.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
