//! ipscan6-packet — C3 packet framer: Ethernet + IPv6 + TCP construction and
//! decoding over a fixed 74-byte buffer (larger, heap-backed buffers for the
//! data-bearing ACKs the banner module sends), via `pnet_packet`'s typed
//! views.

pub mod error;
pub mod frame;

pub use error::PacketError;
pub use frame::{
    ack_frame_len, checksum, decode_frame, eth_decode, eth_prepare, ip_decode, ip_modify,
    ip_prepare, make_ack, make_syn, syn_cookie, tcp_decode, DecodedFrame, DecodedIp, DecodedTcp,
    EthSettings, IpSettings, ETH_LEN, FRAME_LEN, IP_LEN, TCP_LEN,
};
