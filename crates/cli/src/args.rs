//! Command-line surface (spec §6): one target specification plus the
//! recognized options. Help text is written in our own words, not copied
//! from the `fi6s` usage string it was distilled from.

use clap::Parser;
use std::net::Ipv6Addr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ipscan6", version, about = "Stateless IPv6 TCP SYN port scanner")]
pub struct Cli {
    /// Target: ADDR/PREFIX, ADDR/LO-HI bit range, ADDR with 'x' wildcard
    /// nibbles, or @path to load one spec per line from a file
    pub target: String,

    /// Port range(s) to scan, e.g. "80,443,1000-2000"; "-" means 1-65535
    #[arg(short = 'p', long = "ports")]
    pub ports: String,

    /// Randomize destination address order (0 scans linearly instead)
    #[arg(long = "randomize-hosts", default_value_t = 1)]
    pub randomize_hosts: u8,

    /// Print the addresses that would be scanned and exit; never opens a
    /// raw socket or sends a single packet
    #[arg(long = "echo-hosts")]
    pub echo_hosts: bool,

    /// Packets-per-second cap enforced across the whole scan
    #[arg(long = "max-rate", default_value_t = 10_000)]
    pub max_rate: u32,

    /// Fixed TCP source port; omit for a random ephemeral port per probe
    #[arg(long = "source-port")]
    pub source_port: Option<u16>,

    /// Ethernet interface to transmit and capture on
    #[arg(short = 'i', long = "interface")]
    pub interface: String,

    /// Source MAC address, colon-separated hex
    #[arg(long = "source-mac")]
    pub source_mac: String,

    /// Next-hop router MAC address, colon-separated hex
    #[arg(long = "router-mac")]
    pub router_mac: String,

    /// Source IPv6 address used for every outgoing SYN
    #[arg(long = "source-ip")]
    pub source_ip: Ipv6Addr,

    /// IPv6 hop limit
    #[arg(long = "ttl", default_value_t = 64)]
    pub ttl: u8,

    /// Output format
    #[arg(long = "output-format", default_value = "list", value_parser = ["list", "json", "binary"])]
    pub output_format: String,

    /// Write results to this file instead of stdout
    #[arg(long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Suppress the live packets/sec counter
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Attempt a banner grab on every port classified open
    #[arg(long = "banners")]
    pub banners: bool,

    /// Banner grab timeout in milliseconds
    #[arg(long = "banner-timeout", default_value_t = 1000)]
    pub banner_timeout_ms: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}
