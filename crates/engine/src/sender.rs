//! Sender loop (spec §4.6): builds one reusable 74-byte frame, walks the
//! target generator and port iterator, and transmits a SYN per probe under
//! the shared rate limiter. Exits once the target generator is exhausted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ipscan6_common::ScanConfig;
use ipscan6_packet::{
    checksum, eth_prepare, ip_modify, ip_prepare, make_syn, syn_cookie, EthSettings, IpSettings,
    FRAME_LEN, TCP_LEN,
};
use ipscan6_rawsock::RawSocketTx;
use ipscan6_targets::{PortIter, Ports, TargetGenerator};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::util::MacAddr;
use rand::RngCore;
use tracing::warn;

use crate::stats::ScanStats;

const RATE_PARK_GRANULARITY: Duration = Duration::from_millis(1);

fn mac(bytes: [u8; 6]) -> MacAddr {
    MacAddr::new(bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
}

pub fn run(
    config: Arc<ScanConfig>,
    mut targets: TargetGenerator,
    ports: Ports,
    mut tx: RawSocketTx,
    stats: Arc<ScanStats>,
    sender_done: Arc<AtomicBool>,
) {
    let eth_settings = EthSettings {
        source_mac: mac(config.source_mac),
        router_mac: mac(config.router_mac),
    };
    let ip_settings = IpSettings {
        source_addr: config.source_addr,
        ttl: config.ttl,
    };

    let mut frame = [0u8; FRAME_LEN];
    eth_prepare(&mut frame, &eth_settings);
    ip_prepare(&mut frame, &ip_settings, IpNextHeaderProtocols::Tcp);

    let Some(mut dst) = targets.next() else {
        sender_done.store(true, Ordering::SeqCst);
        return;
    };
    ip_modify(&mut frame, TCP_LEN as u16, dst);

    let mut port_iter = PortIter::new();
    port_iter.begin(Some(&ports));
    let mut rng = rand::thread_rng();

    loop {
        let Some(port) = port_iter.next() else {
            dst = match targets.next() {
                Some(addr) => addr,
                None => break,
            };
            ip_modify(&mut frame, TCP_LEN as u16, dst);
            port_iter.begin(None);
            continue;
        };

        let src_port = config
            .source_port
            .unwrap_or_else(|| ((rng.next_u32() as u16) & 0xffff) | 0x1000);
        let seq = syn_cookie(config.cookie_key, dst, port, src_port);
        make_syn(&mut frame, port, src_port, seq);
        checksum(&mut frame);

        if let Err(e) = tx.send(&frame) {
            warn!(error = %e, "transient send failure, skipping probe");
            continue;
        }

        let pre_increment = stats.record_sent();
        if config.max_rate > 0 && pre_increment >= config.max_rate.saturating_sub(1) {
            while stats.sent_this_tick() != 0 {
                thread::sleep(RATE_PARK_GRANULARITY);
            }
        }
    }

    sender_done.store(true, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_from_bytes_preserves_octets() {
        let m = mac([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(m, MacAddr::new(2, 0, 0, 0, 0, 1));
    }
}
