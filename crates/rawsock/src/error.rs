//! Error kinds for crate `ipscan6-rawsock`

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RawSockError {
    #[error("interface {0} not found")]
    NoSuchInterface(String),

    #[error("datalink channel returned an unsupported channel type")]
    UnsupportedChannel,

    #[error("permission denied: raw sockets require root or CAP_NET_RAW")]
    NotPermitted,

    #[error("raw socket send failed: no space in the send queue")]
    SendFailed,

    #[error("raw socket I/O error: {0}")]
    Io(#[from] io::Error),
}
