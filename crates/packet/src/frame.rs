//! Fixed Ethernet(14) + IPv6(40) + TCP(20) frame layout, built and decoded
//! through `pnet_packet`'s typed zero-copy views instead of raw byte-offset
//! casts. No heap allocation per packet: callers own a `[u8; FRAME_LEN]` and
//! hand us `&mut`/`&` slices of it.

use crate::error::PacketError;
use pnet_packet::ethernet::{EtherType, EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet_packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet_packet::ipv6::{Ipv6Packet, MutableIpv6Packet};
use pnet_packet::tcp::{self, MutableTcpPacket, TcpFlags, TcpPacket};
use pnet_packet::util::MacAddr;
use pnet_packet::Packet;
use std::net::Ipv6Addr;

pub const ETH_LEN: usize = 14;
pub const IP_LEN: usize = 40;
pub const TCP_LEN: usize = 20;
pub const FRAME_LEN: usize = ETH_LEN + IP_LEN + TCP_LEN;

const IP_START: usize = ETH_LEN;
const TCP_START: usize = ETH_LEN + IP_LEN;

/// Ethernet addressing, set once before any frame is built.
#[derive(Debug, Clone, Copy)]
pub struct EthSettings {
    pub source_mac: MacAddr,
    pub router_mac: MacAddr,
}

/// IPv6 source addressing, set once before any frame is built.
#[derive(Debug, Clone, Copy)]
pub struct IpSettings {
    pub source_addr: Ipv6Addr,
    pub ttl: u8,
}

pub fn eth_prepare(frame: &mut [u8], settings: &EthSettings) {
    let mut eth =
        MutableEthernetPacket::new(&mut frame[..ETH_LEN]).expect("frame holds a full eth header");
    eth.set_source(settings.source_mac);
    eth.set_destination(settings.router_mac);
    eth.set_ethertype(EtherTypes::Ipv6);
}

pub fn eth_decode(frame: &[u8]) -> Result<EtherType, PacketError> {
    if frame.len() < ETH_LEN {
        return Err(PacketError::Truncated("ethernet"));
    }
    let eth = EthernetPacket::new(&frame[..ETH_LEN]).expect("length checked above");
    Ok(eth.get_ethertype())
}

/// Fills version/traffic-class/flow-label/next-header/hop-limit/source once.
/// Destination and payload length are filled per-packet by `ip_modify`.
pub fn ip_prepare(frame: &mut [u8], settings: &IpSettings, next_header: IpNextHeaderProtocol) {
    let mut ip = MutableIpv6Packet::new(&mut frame[IP_START..IP_START + IP_LEN])
        .expect("frame holds a full ipv6 header");
    ip.set_version(6);
    ip.set_traffic_class(0);
    ip.set_flow_label(0);
    ip.set_next_header(next_header);
    ip.set_hop_limit(settings.ttl);
    ip.set_source(settings.source_addr);
    ip.set_payload_length(TCP_LEN as u16);
    ip.set_destination(Ipv6Addr::UNSPECIFIED);
}

pub fn ip_modify(frame: &mut [u8], payload_len: u16, dst: Ipv6Addr) {
    let mut ip = MutableIpv6Packet::new(&mut frame[IP_START..IP_START + IP_LEN])
        .expect("frame holds a full ipv6 header");
    ip.set_payload_length(payload_len);
    ip.set_destination(dst);
}

pub struct DecodedIp {
    pub next_header: IpNextHeaderProtocol,
    pub payload_len: u16,
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
}

pub fn ip_decode(frame: &[u8]) -> Result<DecodedIp, PacketError> {
    if frame.len() < IP_START + IP_LEN {
        return Err(PacketError::Truncated("ipv6"));
    }
    let ip = Ipv6Packet::new(&frame[IP_START..IP_START + IP_LEN]).expect("length checked above");
    Ok(DecodedIp {
        next_header: ip.get_next_header(),
        payload_len: ip.get_payload_length(),
        src: ip.get_source(),
        dst: ip.get_destination(),
    })
}

/// Fills source/destination ports, sequence number, SYN flag, a fixed
/// window, and zeroes the checksum field ahead of `checksum`.
pub fn make_syn(frame: &mut [u8], dst_port: u16, src_port: u16, seq: u32) {
    let mut tcp = MutableTcpPacket::new(&mut frame[TCP_START..TCP_START + TCP_LEN])
        .expect("frame holds a full tcp header");
    tcp.set_source(src_port);
    tcp.set_destination(dst_port);
    tcp.set_sequence(seq);
    tcp.set_acknowledgement(0);
    tcp.set_data_offset(5);
    tcp.set_reserved(0);
    tcp.set_flags(TcpFlags::SYN);
    tcp.set_window(1024);
    tcp.set_urgent_ptr(0);
    tcp.set_checksum(0);
}

/// Total frame length for a data-bearing ACK carrying `payload_len` bytes
/// past the fixed 20-byte TCP header.
#[must_use]
pub const fn ack_frame_len(payload_len: usize) -> usize {
    ETH_LEN + IP_LEN + TCP_LEN + payload_len
}

/// Fills an ACK completing a stateless handshake, optionally carrying
/// `payload` (the banner query, or empty for a passive read). `seq`/`ack`
/// come from `syn_cookie`/the peer's reported sequence rather than any kept
/// per-connection state — the frame buffer must already be sized by
/// `ack_frame_len(payload.len())`.
pub fn make_ack(frame: &mut [u8], dst_port: u16, src_port: u16, seq: u32, ack: u32, payload: &[u8]) {
    let tcp_total = TCP_LEN + payload.len();
    let mut tcp = MutableTcpPacket::new(&mut frame[TCP_START..TCP_START + tcp_total])
        .expect("frame sized for tcp header plus payload");
    tcp.set_source(src_port);
    tcp.set_destination(dst_port);
    tcp.set_sequence(seq);
    tcp.set_acknowledgement(ack);
    tcp.set_data_offset(5);
    tcp.set_reserved(0);
    tcp.set_flags(if payload.is_empty() {
        TcpFlags::ACK
    } else {
        TcpFlags::ACK | TcpFlags::PSH
    });
    tcp.set_window(1024);
    tcp.set_urgent_ptr(0);
    tcp.set_checksum(0);
    tcp.set_payload(payload);
}

/// Derives a deterministic, SYN-cookie-style sequence number from the probe's
/// addressing instead of keeping per-probe state (spec §9: "a fixed or
/// SYN-cookie-style sequence"). The sender and a later banner-completion step
/// recompute the same value from `key` + `(dst, dst_port, src_port)` rather
/// than remembering it anywhere.
#[must_use]
pub fn syn_cookie(key: u64, dst: Ipv6Addr, dst_port: u16, src_port: u16) -> u32 {
    let addr = u128::from(dst);
    let mut h = key ^ (addr as u64) ^ ((addr >> 64) as u64);
    h = h.wrapping_add((u64::from(dst_port) << 16) | u64::from(src_port));
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h as u32
}

/// Computes the IPv6 pseudo-header TCP checksum and writes it into the
/// frame. Must run last, after every other field is finalized. Covers
/// whatever TCP segment (header plus any payload) follows the IPv6 header.
pub fn checksum(frame: &mut [u8]) {
    let ip = Ipv6Packet::new(&frame[IP_START..IP_START + IP_LEN]).expect("ipv6 header present");
    let src = ip.get_source();
    let dst = ip.get_destination();
    drop(ip);

    let sum = {
        let tcp = TcpPacket::new(&frame[TCP_START..]).expect("tcp header present");
        tcp::ipv6_checksum(&tcp, &src, &dst)
    };

    let mut tcp = MutableTcpPacket::new(&mut frame[TCP_START..]).expect("tcp header present");
    tcp.set_checksum(sum);
}

pub struct DecodedTcp {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: u8,
    data_offset: u8,
}

impl DecodedTcp {
    #[must_use]
    pub fn is_syn_ack(&self) -> bool {
        self.flags & (TcpFlags::SYN | TcpFlags::ACK) == (TcpFlags::SYN | TcpFlags::ACK)
    }

    #[must_use]
    pub fn is_rst_ack(&self) -> bool {
        self.flags & (TcpFlags::RST | TcpFlags::ACK) == (TcpFlags::RST | TcpFlags::ACK)
    }

    /// Header length in bytes, from the wire `data offset` field.
    #[must_use]
    pub fn header_len(&self) -> usize {
        usize::from(self.data_offset) * 4
    }
}

pub fn tcp_decode(frame: &[u8]) -> Result<DecodedTcp, PacketError> {
    if frame.len() < TCP_START + TCP_LEN {
        return Err(PacketError::Truncated("tcp"));
    }
    let tcp = TcpPacket::new(&frame[TCP_START..]).expect("length checked above");
    Ok(DecodedTcp {
        src_port: tcp.get_source(),
        dst_port: tcp.get_destination(),
        seq: tcp.get_sequence(),
        ack: tcp.get_acknowledgement(),
        flags: tcp.get_flags(),
        data_offset: tcp.get_data_offset(),
    })
}

/// One fully layered decode, applying the validation order spec'd for the
/// receive loop: ethertype, then next-header, then flag combination is left
/// to the caller (C6 classifies; this just gets the bytes out safely).
/// `payload` borrows straight out of `frame` — zero-copy, valid only as long
/// as the frame buffer it was decoded from is.
pub struct DecodedFrame<'a> {
    pub ip: DecodedIp,
    pub tcp: DecodedTcp,
    pub payload: &'a [u8],
}

pub fn decode_frame(frame: &[u8]) -> Result<DecodedFrame<'_>, PacketError> {
    let ethertype = eth_decode(frame)?;
    if ethertype != EtherTypes::Ipv6 {
        return Err(PacketError::UnsupportedEthertype(ethertype.0));
    }
    let ip = ip_decode(frame)?;
    if ip.next_header != IpNextHeaderProtocols::Tcp {
        return Err(PacketError::UnsupportedNextHeader(ip.next_header.0));
    }
    let tcp = tcp_decode(frame)?;
    let payload_start = TCP_START + tcp.header_len();
    let payload = frame.get(payload_start..).unwrap_or(&[]);
    Ok(DecodedFrame { ip, tcp, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> (EthSettings, IpSettings) {
        (
            EthSettings {
                source_mac: MacAddr::new(0x02, 0, 0, 0, 0, 1),
                router_mac: MacAddr::new(0x02, 0, 0, 0, 0, 2),
            },
            IpSettings {
                source_addr: "2001:db8::1".parse().unwrap(),
                ttl: 64,
            },
        )
    }

    fn built_syn(dst: Ipv6Addr, dst_port: u16, src_port: u16) -> [u8; FRAME_LEN] {
        let (eth, ip) = settings();
        let mut frame = [0u8; FRAME_LEN];
        eth_prepare(&mut frame, &eth);
        ip_prepare(&mut frame, &ip, IpNextHeaderProtocols::Tcp);
        ip_modify(&mut frame, TCP_LEN as u16, dst);
        make_syn(&mut frame, dst_port, src_port, 0xdead_beef);
        checksum(&mut frame);
        frame
    }

    #[test]
    fn make_syn_then_decode_roundtrips_ports() {
        let frame = built_syn("2001:db8::2".parse().unwrap(), 443, 55123);
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.tcp.src_port, 55123);
        assert_eq!(decoded.tcp.dst_port, 443);
    }

    #[test]
    fn checksum_is_self_consistent() {
        let frame = built_syn("2001:db8::2".parse().unwrap(), 80, 4096);
        let tcp = TcpPacket::new(&frame[TCP_START..TCP_START + TCP_LEN]).unwrap();
        let ip = Ipv6Packet::new(&frame[IP_START..IP_START + IP_LEN]).unwrap();
        let recomputed = tcp::ipv6_checksum(&tcp, &ip.get_source(), &ip.get_destination());
        assert_eq!(tcp.get_checksum(), recomputed);
    }

    #[test]
    fn rejects_non_ipv6_ethertype() {
        let mut frame = built_syn("2001:db8::2".parse().unwrap(), 80, 4096);
        let mut eth = MutableEthernetPacket::new(&mut frame[..ETH_LEN]).unwrap();
        eth.set_ethertype(EtherTypes::Ipv4);
        drop(eth);
        let err = decode_frame(&frame).unwrap_err();
        assert_eq!(err, PacketError::UnsupportedEthertype(EtherTypes::Ipv4.0));
    }

    #[test]
    fn rejects_truncated_frame() {
        let err = decode_frame(&[0u8; 10]).unwrap_err();
        assert_eq!(err, PacketError::Truncated("ethernet"));
    }

    #[test]
    fn syn_cookie_is_deterministic_and_key_dependent() {
        let dst: Ipv6Addr = "2001:db8::2".parse().unwrap();
        let a = syn_cookie(0x1234, dst, 443, 55123);
        let b = syn_cookie(0x1234, dst, 443, 55123);
        let c = syn_cookie(0x5678, dst, 443, 55123);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn make_ack_then_decode_exposes_payload() {
        let (eth, ip) = settings();
        let query = b"GET / HTTP/1.0\r\n\r\n";
        let mut frame = vec![0u8; ack_frame_len(query.len())];
        eth_prepare(&mut frame, &eth);
        ip_prepare(&mut frame, &ip, IpNextHeaderProtocols::Tcp);
        ip_modify(
            &mut frame,
            (TCP_LEN + query.len()) as u16,
            "2001:db8::2".parse().unwrap(),
        );
        make_ack(&mut frame, 80, 55123, 1, 2, query);
        checksum(&mut frame);

        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.tcp.seq, 1);
        assert_eq!(decoded.tcp.ack, 2);
        assert_eq!(decoded.payload, &query[..]);
    }

    #[test]
    fn make_ack_with_empty_payload_decodes_to_empty_payload() {
        let (eth, ip) = settings();
        let mut frame = vec![0u8; ack_frame_len(0)];
        eth_prepare(&mut frame, &eth);
        ip_prepare(&mut frame, &ip, IpNextHeaderProtocols::Tcp);
        ip_modify(&mut frame, TCP_LEN as u16, "2001:db8::2".parse().unwrap());
        make_ack(&mut frame, 80, 55123, 1, 2, &[]);
        checksum(&mut frame);

        let decoded = decode_frame(&frame).unwrap();
        assert!(decoded.payload.is_empty());
    }
}
