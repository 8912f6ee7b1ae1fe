//! Wires parsed CLI args into target/port parsing, `ScanConfig`, and the
//! engine (spec §6's "external interfaces" boundary). `--echo-hosts`
//! bypasses the engine entirely per `original_source/`'s `fi6s` behavior.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ipscan6_common::ScanConfig;
use ipscan6_targets::{load_spec_file, parse_port_spec, TargetGenerator, TargetSpec};

use crate::args::Cli;
use crate::output::build_sink;

pub fn run(cli: Cli) -> Result<()> {
    let specs = load_targets(&cli.target).context("failed to parse target specification")?;
    let randomized = cli.randomize_hosts != 0;

    if cli.echo_hosts {
        echo_hosts(specs, randomized);
        return Ok(());
    }

    let ports = parse_port_spec(&cli.ports).context("failed to parse -p port specification")?;
    let source_mac = parse_mac(&cli.source_mac).context("invalid --source-mac")?;
    let router_mac = parse_mac(&cli.router_mac).context("invalid --router-mac")?;

    let config = Arc::new(ScanConfig {
        interface: cli.interface.clone(),
        source_mac,
        router_mac,
        source_addr: cli.source_ip,
        source_port: cli.source_port,
        ttl: cli.ttl,
        max_rate: cli.max_rate,
        quiet: cli.quiet,
        grab_banners: cli.banners,
        banner_timeout_ms: cli.banner_timeout_ms,
        cookie_key: rand::random(),
    });

    let mut generator = TargetGenerator::new(randomized);
    for spec in specs {
        generator.add(spec);
    }

    let sink = build_sink(&cli.output_format, cli.output_file.as_deref())
        .context("failed to open output destination")?;

    info!(
        interface = %config.interface,
        ports = %cli.ports,
        rate = config.max_rate,
        "scan configuration ready"
    );

    let summary = ipscan6_engine::run(config, generator, ports, sink).context(
        "scan engine failed. Make sure you have CAP_NET_RAW or are running as root.",
    )?;

    info!(
        sent = summary.total_sent,
        recv = summary.total_recv,
        "scan finished"
    );
    Ok(())
}

fn load_targets(target: &str) -> Result<Vec<TargetSpec>> {
    if let Some(path) = target.strip_prefix('@') {
        Ok(load_spec_file(path)?)
    } else {
        Ok(vec![TargetSpec::parse(target)?])
    }
}

fn echo_hosts(specs: Vec<TargetSpec>, randomized: bool) {
    let mut generator = TargetGenerator::new(randomized);
    for spec in specs {
        generator.add(spec);
    }
    while let Some(addr) = generator.next() {
        println!("{addr}");
    }
}

fn parse_mac(s: &str) -> Result<[u8; 6]> {
    let mut mac = [0u8; 6];
    let parts: Vec<&str> = s.split(':').collect();
    anyhow::ensure!(parts.len() == 6, "expected 6 colon-separated hex octets, got {}", parts.len());
    for (i, part) in parts.iter().enumerate() {
        mac[i] = u8::from_str_radix(part, 16)
            .with_context(|| format!("invalid hex octet '{part}'"))?;
    }
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mac_accepts_lowercase_hex() {
        assert_eq!(parse_mac("02:00:00:00:00:01").unwrap(), [2, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn parse_mac_rejects_wrong_octet_count() {
        assert!(parse_mac("02:00:00").is_err());
    }

    #[test]
    fn parse_mac_rejects_non_hex() {
        assert!(parse_mac("zz:00:00:00:00:01").is_err());
    }

    #[test]
    fn load_targets_single_spec() {
        let specs = load_targets("2001:db8::/126").unwrap();
        assert_eq!(specs.len(), 1);
    }
}
