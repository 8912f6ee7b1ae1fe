//! Optional third thread resolving spec §9's open question in favor of a
//! dedicated banner-grab thread: the sender/receiver loops never block on
//! it. Fed open-port findings over an mpsc channel by the receiver, it
//! completes the banner read on the same raw Ethernet/IPv6/TCP pipeline C3
//! and C4 use for probing — an ACK crafted from the deterministic SYN-cookie
//! sequence and the peer's reported sequence, never a kernel `TcpStream`
//! (spec §1: "no full handshake").

use std::net::Ipv6Addr;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use ipscan6_banner::{get_query, postprocess};
use ipscan6_common::{PortState, ScanResult};
use ipscan6_packet::{
    ack_frame_len, checksum, decode_frame, eth_prepare, ip_modify, ip_prepare, make_ack,
    syn_cookie, EthSettings, IpSettings, TCP_LEN,
};
use ipscan6_rawsock::{Filter, FilterFlags, RawSocket};
use pnet_packet::ip::IpNextHeaderProtocols;
use tracing::debug;

/// Everything the banner thread needs to craft the completing ACK without
/// either side keeping per-probe state: the deterministic sequence is
/// recomputed from `addr`/`port`/`src_port`, and `peer_seq` is the SYN/ACK's
/// sequence number the receiver already read off the wire.
#[derive(Debug, Clone, Copy)]
pub struct BannerTarget {
    pub addr: Ipv6Addr,
    pub port: u16,
    pub src_port: u16,
    pub peer_seq: u32,
}

pub fn run(
    interface: String,
    eth_settings: EthSettings,
    ip_settings: IpSettings,
    cookie_key: u64,
    queue: Receiver<BannerTarget>,
    results: Sender<ScanResult>,
    timeout_ms: u64,
) {
    let mut socket = match RawSocket::open(&interface) {
        Ok(s) => s,
        Err(e) => {
            debug!(error = %e, "banner thread failed to open raw socket, emitting bannerless results");
            for target in queue {
                if results
                    .send(ScanResult::new(target.addr, target.port, PortState::Open))
                    .is_err()
                {
                    break;
                }
            }
            return;
        }
    };
    socket.setfilter(Filter::new(
        FilterFlags::IPTYPE | FilterFlags::DSTADDR,
        IpNextHeaderProtocols::Tcp,
        ip_settings.source_addr,
        0,
    ));

    let timeout = Duration::from_millis(timeout_ms.max(1));
    for target in queue {
        let banner = grab(&mut socket, &eth_settings, &ip_settings, cookie_key, target, timeout);
        let mut result = ScanResult::new(target.addr, target.port, PortState::Open);
        if let Some(b) = banner {
            result = result.with_banner(b);
        }
        if results.send(result).is_err() {
            break;
        }
    }
}

/// Builds the completing ACK frame, carrying `payload` (empty for a passive
/// read, the service's probe bytes for an active one). Pure and allocation
/// only, so it's testable without a real socket.
fn build_ack_frame(
    eth_settings: &EthSettings,
    ip_settings: &IpSettings,
    target: BannerTarget,
    our_seq: u32,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = vec![0u8; ack_frame_len(payload.len())];
    eth_prepare(&mut frame, eth_settings);
    ip_prepare(&mut frame, ip_settings, IpNextHeaderProtocols::Tcp);
    ip_modify(&mut frame, (TCP_LEN + payload.len()) as u16, target.addr);
    make_ack(
        &mut frame,
        target.port,
        target.src_port,
        our_seq,
        target.peer_seq.wrapping_add(1),
        payload,
    );
    checksum(&mut frame);
    frame
}

fn wait_for_payload(socket: &mut RawSocket, target: BannerTarget, deadline: Instant) -> Option<Vec<u8>> {
    while Instant::now() < deadline {
        match socket.sniff() {
            Ok(Some(frame)) => {
                let Ok(decoded) = decode_frame(frame) else {
                    continue;
                };
                if decoded.ip.src != target.addr
                    || decoded.tcp.src_port != target.port
                    || decoded.tcp.dst_port != target.src_port
                    || decoded.payload.is_empty()
                {
                    continue;
                }
                return Some(decoded.payload.to_vec());
            }
            Ok(None) => continue,
            Err(e) => {
                debug!(error = %e, "banner sniff failed, abandoning this target");
                return None;
            }
        }
    }
    None
}

fn grab(
    socket: &mut RawSocket,
    eth_settings: &EthSettings,
    ip_settings: &IpSettings,
    cookie_key: u64,
    target: BannerTarget,
    timeout: Duration,
) -> Option<Vec<u8>> {
    let our_seq =
        syn_cookie(cookie_key, target.addr, target.port, target.src_port).wrapping_add(1);

    let passive = build_ack_frame(eth_settings, ip_settings, target, our_seq, &[]);
    socket.send(&passive).ok()?;

    let passive_deadline = Instant::now() + timeout / 2;
    if let Some(mut captured) = wait_for_payload(socket, target, passive_deadline) {
        postprocess(&mut captured);
        return Some(captured);
    }

    let query = get_query(target.port)?;
    let active = build_ack_frame(eth_settings, ip_settings, target, our_seq, query);
    socket.send(&active).ok()?;

    let active_deadline = Instant::now() + timeout / 2;
    let mut captured = wait_for_payload(socket, target, active_deadline)?;
    postprocess(&mut captured);
    Some(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipscan6_packet::decode_frame;
    use pnet_packet::util::MacAddr;

    fn settings() -> (EthSettings, IpSettings) {
        (
            EthSettings {
                source_mac: MacAddr::new(2, 0, 0, 0, 0, 1),
                router_mac: MacAddr::new(2, 0, 0, 0, 0, 2),
            },
            IpSettings {
                source_addr: "2001:db8::1".parse().unwrap(),
                ttl: 64,
            },
        )
    }

    #[test]
    fn passive_ack_carries_no_payload_and_acks_peer_seq_plus_one() {
        let (eth, ip) = settings();
        let target = BannerTarget {
            addr: "2001:db8::2".parse().unwrap(),
            port: 80,
            src_port: 55123,
            peer_seq: 0xdead_beef,
        };
        let our_seq = syn_cookie(0x1234, target.addr, target.port, target.src_port) + 1;
        let frame = build_ack_frame(&eth, &ip, target, our_seq, &[]);
        let decoded = decode_frame(&frame).unwrap();
        assert!(decoded.payload.is_empty());
        assert_eq!(decoded.tcp.seq, our_seq);
        assert_eq!(decoded.tcp.ack, target.peer_seq.wrapping_add(1));
        assert_eq!(decoded.tcp.src_port, target.src_port);
        assert_eq!(decoded.tcp.dst_port, target.port);
    }

    #[test]
    fn active_ack_carries_the_service_query() {
        let (eth, ip) = settings();
        let target = BannerTarget {
            addr: "2001:db8::2".parse().unwrap(),
            port: 80,
            src_port: 55123,
            peer_seq: 1,
        };
        let query = get_query(80).unwrap();
        let frame = build_ack_frame(&eth, &ip, target, 1, query);
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.payload, query);
    }

    #[test]
    fn same_target_yields_same_sequence_across_calls() {
        let target = BannerTarget {
            addr: "2001:db8::2".parse().unwrap(),
            port: 443,
            src_port: 4096,
            peer_seq: 7,
        };
        let a = syn_cookie(0x1234, target.addr, target.port, target.src_port);
        let b = syn_cookie(0x1234, target.addr, target.port, target.src_port);
        assert_eq!(a, b);
    }
}
