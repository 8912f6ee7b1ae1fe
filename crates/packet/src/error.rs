//! Decode error kinds for crate `ipscan6-packet`

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PacketError {
    #[error("frame too short for {0} header")]
    Truncated(&'static str),

    #[error("unsupported ethertype {0:#06x}")]
    UnsupportedEthertype(u16),

    #[error("unsupported IPv6 next header {0}")]
    UnsupportedNextHeader(u8),
}
