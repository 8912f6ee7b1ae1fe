//! ipscan6-common — Shared data types for the ipscan6 scanner
//!
//! This crate carries only what every other crate in the workspace needs to
//! agree on: the result/config data model. Error kinds are per-crate
//! (`TargetError`, `PacketError`, `RawSockError`, `EngineError`); this crate
//! has no scanning logic of its own.

pub mod types;

pub use types::{PortState, ScanConfig, ScanResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
