//! Receiver loop (spec §4.6): sniffs frames, validates layer-by-layer,
//! requires `ACK && (SYN || RST)`, and classifies the rest. Runs until a
//! fatal sniff error, or until the sender is done and a grace period has
//! elapsed (best-effort drain of late responses).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ipscan6_common::{PortState, ScanResult};
use ipscan6_packet::decode_frame;
use ipscan6_rawsock::RawSocketRx;
use tracing::{debug, error};

use crate::banner::BannerTarget;
use crate::stats::ScanStats;

/// How long the receiver keeps classifying responses after the sender
/// reports exhaustion, to catch in-flight SYN/ACKs (spec §4.6 "grace period
/// ... implementation choice").
pub const GRACE_PERIOD: Duration = Duration::from_secs(3);

pub fn run(
    mut rx: RawSocketRx,
    stats: Arc<ScanStats>,
    results: Sender<ScanResult>,
    banner_queue: Option<Sender<BannerTarget>>,
    sender_done: Arc<AtomicBool>,
) {
    let mut draining_since: Option<Instant> = None;

    loop {
        match rx.sniff() {
            Ok(Some(frame)) => {
                stats.record_recv();
                draining_since = None;
                match decode_frame(frame) {
                    Ok(decoded) => {
                        let is_open = decoded.tcp.is_syn_ack();
                        let is_closed = decoded.tcp.is_rst_ack();
                        if !is_open && !is_closed {
                            continue;
                        }
                        let addr = decoded.ip.src;
                        let port = decoded.tcp.src_port;
                        let state = if is_open {
                            PortState::Open
                        } else {
                            PortState::Closed
                        };

                        if state == PortState::Open {
                            if let Some(queue) = &banner_queue {
                                let target = BannerTarget {
                                    addr,
                                    port,
                                    src_port: decoded.tcp.dst_port,
                                    peer_seq: decoded.tcp.seq,
                                };
                                if queue.send(target).is_ok() {
                                    continue;
                                }
                            }
                        }
                        let _ = results.send(ScanResult::new(addr, port, state));
                    }
                    Err(e) => debug!(error = %e, "dropping undecodable frame"),
                }
            }
            Ok(None) => {
                if sender_done.load(Ordering::SeqCst) {
                    let since = *draining_since.get_or_insert_with(Instant::now);
                    if since.elapsed() >= GRACE_PERIOD {
                        break;
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "fatal sniff error, receiver exiting");
                break;
            }
        }
    }
}
