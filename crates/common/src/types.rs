//! Core data types for the ipscan6 scanner (spec §3 "Data model")
//!
//! Kept deliberately small: the hot path (sender/receiver threads) never
//! touches these types except to build a `ScanResult` right before handing
//! it to an output sink, so there's no need for the builder-heavy style the
//! teacher's `ProbeResult` used for its much larger result shape.

use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use std::time::SystemTime;

/// Classification of a probed port. Spec §3 allows only these two states —
/// unlike a connect-scan, a stateless SYN scan that receives no response
/// records nothing at all, so there is no `Filtered` variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortState {
    Open,
    Closed,
}

impl std::fmt::Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PortState::Open => "open",
            PortState::Closed => "closed",
        })
    }
}

/// One classified probe, ready for an output sink. Transient: the engine
/// builds one of these per received frame and hands it straight to the sink
/// (spec §3 "Result: ... Transient; handed to the output sink immediately").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub addr: Ipv6Addr,
    pub port: u16,
    pub state: PortState,
    pub banner: Option<Vec<u8>>,
    #[serde(skip, default = "SystemTime::now")]
    pub timestamp: SystemTime,
}

impl ScanResult {
    #[inline]
    #[must_use]
    pub fn new(addr: Ipv6Addr, port: u16, state: PortState) -> Self {
        Self {
            addr,
            port,
            state,
            banner: None,
            timestamp: SystemTime::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_banner(mut self, banner: Vec<u8>) -> Self {
        self.banner = Some(banner);
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, PortState::Open)
    }
}

/// Ethernet/IP configuration that is set once before any thread starts and
/// read-only thereafter (spec §9 design note: "re-architect as an explicit
/// Scan Config value threaded into sender/receiver at construction").
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub interface: String,
    pub source_mac: [u8; 6],
    pub router_mac: [u8; 6],
    pub source_addr: Ipv6Addr,
    pub source_port: Option<u16>,
    pub ttl: u8,
    pub max_rate: u32,
    pub quiet: bool,
    pub grab_banners: bool,
    pub banner_timeout_ms: u64,
    /// Drawn once at startup and shared read-only: seeds the stateless
    /// SYN-cookie-style sequence number (`ipscan6_packet::syn_cookie`), so
    /// the sender and a later banner-completion step can independently
    /// recompute the same sequence without keeping per-probe state.
    pub cookie_key: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_result_builders() {
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let r = ScanResult::new(addr, 80, PortState::Open).with_banner(b"hi".to_vec());
        assert!(r.is_open());
        assert_eq!(r.banner.as_deref(), Some(&b"hi"[..]));
    }

    #[test]
    fn port_state_display() {
        assert_eq!(PortState::Open.to_string(), "open");
        assert_eq!(PortState::Closed.to_string(), "closed");
    }
}
