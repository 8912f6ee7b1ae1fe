//! Error kinds for target spec parsing (crate `ipscan6-targets`)

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("invalid IPv6 address in target spec: {0}")]
    InvalidAddress(String),

    #[error("invalid prefix length in target spec: {0}")]
    InvalidPrefix(String),

    #[error("invalid bit range in target spec: {0}")]
    InvalidRange(String),

    #[error("invalid wildcard-nibble spec: {0}")]
    InvalidWildcard(String),

    #[error("invalid port range: {0}")]
    InvalidPorts(String),

    #[error("failed to read target spec file: {0}")]
    File(#[from] io::Error),
}
