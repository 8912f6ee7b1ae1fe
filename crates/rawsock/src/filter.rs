//! Software stand-in for the kernel/BPF capture filter spec'd in C4.
//!
//! `pnet_datalink` doesn't expose portable kernel filter attachment, so
//! `setfilter`'s {IPTYPE, DSTADDR, DSTPORT} flags are applied here as a
//! byte-offset predicate run in the receive loop before a frame is handed to
//! the decoder. Offsets match the fixed frame layout in `ipscan6-packet`.

use pnet_packet::ip::IpNextHeaderProtocol;
use std::net::Ipv6Addr;

const ETHERTYPE_IPV6: [u8; 2] = [0x86, 0xDD];
const ETH_LEN: usize = 14;
const IP_NEXT_HEADER_OFFSET: usize = ETH_LEN + 6;
const IP_DST_OFFSET: usize = ETH_LEN + 24;
const TCP_START: usize = ETH_LEN + 40;
const TCP_DST_PORT_OFFSET: usize = TCP_START + 2;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FilterFlags: u8 {
        const IPTYPE = 0b001;
        const DSTADDR = 0b010;
        const DSTPORT = 0b100;
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    flags: FilterFlags,
    ip_type: IpNextHeaderProtocol,
    local_addr: Ipv6Addr,
    local_port: u16,
}

impl Filter {
    #[must_use]
    pub fn new(
        flags: FilterFlags,
        ip_type: IpNextHeaderProtocol,
        local_addr: Ipv6Addr,
        local_port: u16,
    ) -> Self {
        Self {
            flags,
            ip_type,
            local_addr,
            local_port,
        }
    }

    #[must_use]
    pub fn matches(&self, frame: &[u8]) -> bool {
        if self.flags.contains(FilterFlags::IPTYPE) {
            if frame.len() < IP_NEXT_HEADER_OFFSET + 1 || frame[12..14] != ETHERTYPE_IPV6 {
                return false;
            }
            if frame[IP_NEXT_HEADER_OFFSET] != self.ip_type.0 {
                return false;
            }
        }
        if self.flags.contains(FilterFlags::DSTADDR) {
            if frame.len() < IP_DST_OFFSET + 16 {
                return false;
            }
            if frame[IP_DST_OFFSET..IP_DST_OFFSET + 16] != self.local_addr.octets() {
                return false;
            }
        }
        if self.flags.contains(FilterFlags::DSTPORT) {
            if frame.len() < TCP_DST_PORT_OFFSET + 2 {
                return false;
            }
            let port = u16::from_be_bytes([frame[TCP_DST_PORT_OFFSET], frame[TCP_DST_PORT_OFFSET + 1]]);
            if port != self.local_port {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipscan6_packet::{checksum, eth_prepare, ip_modify, ip_prepare, make_syn, EthSettings, IpSettings, FRAME_LEN};
    use pnet_packet::ip::IpNextHeaderProtocols;
    use pnet_packet::util::MacAddr;

    fn frame(dst: Ipv6Addr, dst_port: u16) -> [u8; FRAME_LEN] {
        let mut f = [0u8; FRAME_LEN];
        eth_prepare(
            &mut f,
            &EthSettings {
                source_mac: MacAddr::new(2, 0, 0, 0, 0, 1),
                router_mac: MacAddr::new(2, 0, 0, 0, 0, 2),
            },
        );
        ip_prepare(
            &mut f,
            &IpSettings {
                source_addr: "2001:db8::1".parse().unwrap(),
                ttl: 64,
            },
            IpNextHeaderProtocols::Tcp,
        );
        ip_modify(&mut f, 20, dst);
        make_syn(&mut f, dst_port, 4096, 1);
        checksum(&mut f);
        f
    }

    #[test]
    fn matches_on_dst_addr_and_port() {
        let local: Ipv6Addr = "2001:db8::2".parse().unwrap();
        let filter = Filter::new(
            FilterFlags::IPTYPE | FilterFlags::DSTADDR | FilterFlags::DSTPORT,
            IpNextHeaderProtocols::Tcp,
            local,
            443,
        );
        assert!(filter.matches(&frame(local, 443)));
        assert!(!filter.matches(&frame(local, 80)));
        assert!(!filter.matches(&frame("2001:db8::3".parse().unwrap(), 443)));
    }

    #[test]
    fn no_flags_matches_everything() {
        let filter = Filter::new(
            FilterFlags::empty(),
            IpNextHeaderProtocols::Tcp,
            "2001:db8::2".parse().unwrap(),
            443,
        );
        assert!(filter.matches(&frame("2001:db8::9".parse().unwrap(), 9999)));
    }
}
