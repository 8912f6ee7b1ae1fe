//! Open interface, install the software capture filter, transmit, and sniff
//! (C4). Wraps `pnet_datalink::channel`, which talks `AF_PACKET` on Linux —
//! the same primitive the teacher workspace's capture loop used, behind a
//! cross-platform abstraction instead of hand-rolled `libc` socket calls.

use crate::error::RawSockError;
use crate::filter::Filter;
use pnet_datalink::{Channel, Config, DataLinkReceiver, DataLinkSender};
use std::io;
use std::time::Duration;

/// How long `sniff` blocks waiting for a frame before returning "no packet
/// this cycle" — gives the receive loop a chance to notice shutdown.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

pub struct RawSocket {
    tx: Box<dyn DataLinkSender>,
    rx: Box<dyn DataLinkReceiver>,
    filter: Option<Filter>,
}

impl RawSocket {
    /// Acquires an Ethernet-level send/receive handle on `interface_name`.
    pub fn open(interface_name: &str) -> Result<Self, RawSockError> {
        let interface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == interface_name)
            .ok_or_else(|| RawSockError::NoSuchInterface(interface_name.to_string()))?;

        let config = Config {
            read_timeout: Some(READ_TIMEOUT),
            ..Config::default()
        };

        match pnet_datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => Ok(Self {
                tx,
                rx,
                filter: None,
            }),
            Ok(_) => Err(RawSockError::UnsupportedChannel),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(RawSockError::NotPermitted),
            Err(e) => Err(RawSockError::Io(e)),
        }
    }

    /// Installs the software capture filter applied on every `sniff`.
    pub fn setfilter(&mut self, filter: Filter) {
        self.filter = Some(filter);
    }

    /// Transmits one frame. Blocking is permitted; expected to be negligible.
    pub fn send(&mut self, buf: &[u8]) -> Result<(), RawSockError> {
        match self.tx.send_to(buf, None) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(RawSockError::Io(e)),
            None => Err(RawSockError::SendFailed),
        }
    }

    /// Returns `Ok(Some(frame))` for a frame passing the installed filter,
    /// `Ok(None)` on a read timeout or a frame the filter drops, and `Err`
    /// for a fatal error that should terminate the receive loop.
    pub fn sniff(&mut self) -> Result<Option<&[u8]>, RawSockError> {
        match self.rx.next() {
            Ok(frame) => match &self.filter {
                Some(f) if !f.matches(frame) => Ok(None),
                _ => Ok(Some(frame)),
            },
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(RawSockError::Io(e)),
        }
    }

    /// Splits the handle into independent sender/receiver halves so the
    /// send and receive loops can run on separate OS threads (spec §5: the
    /// sender and receiver never share access to each other's resources).
    #[must_use]
    pub fn split(self) -> (RawSocketTx, RawSocketRx) {
        (
            RawSocketTx { tx: self.tx },
            RawSocketRx {
                rx: self.rx,
                filter: self.filter,
            },
        )
    }
}

/// Send-only half of a split `RawSocket`, owned by the sender thread.
pub struct RawSocketTx {
    tx: Box<dyn DataLinkSender>,
}

impl RawSocketTx {
    /// Transmits one frame. Blocking is permitted; expected to be negligible.
    pub fn send(&mut self, buf: &[u8]) -> Result<(), RawSockError> {
        match self.tx.send_to(buf, None) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(RawSockError::Io(e)),
            None => Err(RawSockError::SendFailed),
        }
    }
}

/// Receive-only half of a split `RawSocket`, owned by the receiver thread.
pub struct RawSocketRx {
    rx: Box<dyn DataLinkReceiver>,
    filter: Option<Filter>,
}

impl RawSocketRx {
    /// Installs the software capture filter applied on every `sniff`.
    pub fn setfilter(&mut self, filter: Filter) {
        self.filter = Some(filter);
    }

    /// Returns `Ok(Some(frame))` for a frame passing the installed filter,
    /// `Ok(None)` on a read timeout or a frame the filter drops, and `Err`
    /// for a fatal error that should terminate the receive loop.
    pub fn sniff(&mut self) -> Result<Option<&[u8]>, RawSockError> {
        match self.rx.next() {
            Ok(frame) => match &self.filter {
                Some(f) if !f.matches(frame) => Ok(None),
                _ => Ok(Some(frame)),
            },
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(None)
            }
            Err(e) => Err(RawSockError::Io(e)),
        }
    }
}
