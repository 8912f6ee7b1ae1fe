//! ipscan6-engine — C6 scan engine: composes C1 (targets) through C5
//! (banner) into the sender/receiver/stats threads spec §4.6 describes.

mod banner;
pub mod error;
mod receiver;
mod sender;
mod sink;
pub mod stats;

pub use error::{EngineError, Result};
pub use receiver::GRACE_PERIOD;
pub use sink::{NullSink, OutputSink};
pub use stats::ScanStats;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ipscan6_common::ScanConfig;
use ipscan6_packet::{EthSettings, IpSettings};
use ipscan6_rawsock::{Filter, FilterFlags, RawSocket};
use ipscan6_targets::{Ports, TargetGenerator};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::util::MacAddr;
use tracing::info;

fn mac(bytes: [u8; 6]) -> MacAddr {
    MacAddr::new(bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
}

const TICK: Duration = Duration::from_secs(1);
const OUTPUT_POLL: Duration = Duration::from_millis(100);

/// Totals accumulated over the lifetime of one `run` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanSummary {
    pub total_sent: u64,
    pub total_recv: u64,
}

/// Opens the interface, spawns sender/receiver/(optional banner) threads,
/// and drives the stats ticker and output sink from the calling thread
/// until every thread has finished (spec §5: main blocks in a 1 s `usleep`
/// between stat prints; here that wait also drains the results channel).
pub fn run(
    config: Arc<ScanConfig>,
    targets: TargetGenerator,
    ports: Ports,
    mut sink: Box<dyn OutputSink>,
) -> Result<ScanSummary> {
    let raw = RawSocket::open(&config.interface)?;
    let (tx_half, mut rx_half) = raw.split();

    let filter_flags = FilterFlags::IPTYPE
        | FilterFlags::DSTADDR
        | if config.source_port.is_some() {
            FilterFlags::DSTPORT
        } else {
            FilterFlags::empty()
        };
    rx_half.setfilter(Filter::new(
        filter_flags,
        IpNextHeaderProtocols::Tcp,
        config.source_addr,
        config.source_port.unwrap_or(0),
    ));

    let stats = Arc::new(ScanStats::new());
    let sender_done = Arc::new(AtomicBool::new(false));
    let (results_tx, results_rx) = mpsc::channel();
    let (banner_tx, banner_rx) = mpsc::channel();

    info!(
        interface = %config.interface,
        rate = config.max_rate,
        ttl = config.ttl,
        "starting scan"
    );

    sink.begin()?;

    let sender_handle = {
        let config = config.clone();
        let stats = stats.clone();
        let sender_done = sender_done.clone();
        thread::Builder::new()
            .name("ipscan6-sender".into())
            .spawn(move || sender::run(config, targets, ports, tx_half, stats, sender_done))
            .expect("spawning sender thread")
    };

    let banner_handle = config.grab_banners.then(|| {
        let results_tx = results_tx.clone();
        let interface = config.interface.clone();
        let eth_settings = EthSettings {
            source_mac: mac(config.source_mac),
            router_mac: mac(config.router_mac),
        };
        let ip_settings = IpSettings {
            source_addr: config.source_addr,
            ttl: config.ttl,
        };
        let cookie_key = config.cookie_key;
        let timeout_ms = config.banner_timeout_ms;
        thread::Builder::new()
            .name("ipscan6-banner".into())
            .spawn(move || {
                banner::run(
                    interface,
                    eth_settings,
                    ip_settings,
                    cookie_key,
                    banner_rx,
                    results_tx,
                    timeout_ms,
                )
            })
            .expect("spawning banner thread")
    });

    let receiver_handle = {
        let stats = stats.clone();
        let results_tx = results_tx.clone();
        let sender_done = sender_done.clone();
        let banner_queue = config.grab_banners.then_some(banner_tx);
        thread::Builder::new()
            .name("ipscan6-receiver".into())
            .spawn(move || receiver::run(rx_half, stats, results_tx, banner_queue, sender_done))
            .expect("spawning receiver thread")
    };

    drop(results_tx);

    let mut last_tick = Instant::now();
    loop {
        match results_rx.recv_timeout(OUTPUT_POLL) {
            Ok(result) => sink.record(&result)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_tick.elapsed() >= TICK {
            let (sent, recv) = stats.tick();
            if !config.quiet {
                print!("\rsent: {sent} pps   recv: {recv} pps");
                let _ = std::io::stdout().flush();
            }
            last_tick = Instant::now();
        }
    }

    sender_handle.join().map_err(|_| EngineError::SenderPanicked)?;
    receiver_handle
        .join()
        .map_err(|_| EngineError::ReceiverPanicked)?;
    if let Some(handle) = banner_handle {
        handle.join().map_err(|_| EngineError::BannerPanicked)?;
    }

    if !config.quiet {
        println!();
    }
    sink.end()?;

    let (total_sent, total_recv) = stats.totals();
    info!(total_sent, total_recv, "scan complete");
    Ok(ScanSummary {
        total_sent,
        total_recv,
    })
}
