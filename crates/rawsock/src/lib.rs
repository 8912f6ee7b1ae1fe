//! ipscan6-rawsock — C4 raw socket I/O: open, filter, send, sniff.

pub mod error;
pub mod filter;
pub mod socket;

pub use error::RawSockError;
pub use filter::{Filter, FilterFlags};
pub use socket::{RawSocket, RawSocketRx, RawSocketTx};
