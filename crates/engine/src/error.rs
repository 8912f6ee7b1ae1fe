//! Error kinds for crate `ipscan6-engine`

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("raw socket initialization failed: {0}")]
    RawSock(#[from] ipscan6_rawsock::RawSockError),

    #[error("sender thread exited abnormally")]
    SenderPanicked,

    #[error("receiver thread exited abnormally")]
    ReceiverPanicked,

    #[error("banner thread exited abnormally")]
    BannerPanicked,

    #[error("output sink error: {0}")]
    Sink(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
