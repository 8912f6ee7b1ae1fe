//! Output sink implementations (spec §6): list, json, and binary, all
//! writing to stdout or to `--output-file`. The engine only ever sees the
//! `OutputSink` trait; picking a concrete format is the CLI's job.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ipscan6_common::{PortState, ScanResult};
use ipscan6_engine::OutputSink;

fn open_destination(path: Option<&Path>) -> io::Result<Box<dyn Write + Send>> {
    match path {
        Some(p) => Ok(Box::new(BufWriter::new(File::create(p)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// One line per result: `addr port state [banner]`.
pub struct ListSink {
    out: Box<dyn Write + Send>,
}

impl ListSink {
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        Ok(Self {
            out: open_destination(path)?,
        })
    }
}

impl OutputSink for ListSink {
    fn record(&mut self, result: &ScanResult) -> io::Result<()> {
        let service = ipscan6_banner::service_type(result.port).unwrap_or("unknown");
        match &result.banner {
            Some(banner) => writeln!(
                self.out,
                "{} {} {} {} {}",
                result.addr,
                result.port,
                result.state,
                service,
                String::from_utf8_lossy(banner)
            ),
            None => writeln!(
                self.out,
                "{} {} {} {}",
                result.addr, result.port, result.state, service
            ),
        }
    }

    fn end(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// A JSON array, streamed one object at a time so memory stays flat across
/// a scan with millions of results.
pub struct JsonSink {
    out: Box<dyn Write + Send>,
    wrote_any: bool,
}

impl JsonSink {
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        Ok(Self {
            out: open_destination(path)?,
            wrote_any: false,
        })
    }
}

impl OutputSink for JsonSink {
    fn begin(&mut self) -> io::Result<()> {
        write!(self.out, "[")
    }

    fn record(&mut self, result: &ScanResult) -> io::Result<()> {
        if self.wrote_any {
            write!(self.out, ",")?;
        }
        self.wrote_any = true;
        serde_json::to_writer(&mut self.out, result)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn end(&mut self) -> io::Result<()> {
        writeln!(self.out, "]")?;
        self.out.flush()
    }
}

/// Fixed-record binary format: 16-byte address, 2-byte port (BE), 1-byte
/// status (0 = open, 1 = closed), 2-byte banner length (BE), banner bytes.
/// Every multi-byte field is length-prefixed rather than null-terminated,
/// the same "no scanning for a terminator" choice the packet buffers in
/// `ipscan6-packet` make.
pub struct BinarySink {
    out: Box<dyn Write + Send>,
}

impl BinarySink {
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        Ok(Self {
            out: open_destination(path)?,
        })
    }
}

impl OutputSink for BinarySink {
    fn record(&mut self, result: &ScanResult) -> io::Result<()> {
        self.out.write_all(&result.addr.octets())?;
        self.out.write_all(&result.port.to_be_bytes())?;
        let status: u8 = match result.state {
            PortState::Open => 0,
            PortState::Closed => 1,
        };
        self.out.write_all(&[status])?;
        let banner = result.banner.as_deref().unwrap_or(&[]);
        let len = u16::try_from(banner.len()).unwrap_or(u16::MAX);
        self.out.write_all(&len.to_be_bytes())?;
        self.out.write_all(&banner[..len as usize])
    }

    fn end(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Builds the sink named by `--output-format`.
pub fn build_sink(format: &str, path: Option<&Path>) -> io::Result<Box<dyn OutputSink>> {
    match format {
        "json" => Ok(Box::new(JsonSink::new(path)?)),
        "binary" => Ok(Box::new(BinarySink::new(path)?)),
        _ => Ok(Box::new(ListSink::new(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn sample(banner: Option<&str>) -> ScanResult {
        let mut r = ScanResult::new("2001:db8::1".parse::<Ipv6Addr>().unwrap(), 80, PortState::Open);
        if let Some(b) = banner {
            r = r.with_banner(b.as_bytes().to_vec());
        }
        r
    }

    #[test]
    fn list_sink_writes_one_line_per_record() {
        let mut buf = Vec::new();
        {
            let mut sink = ListSink { out: Box::new(&mut buf) };
            sink.record(&sample(None)).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "2001:db8::1 80 open http\n");
    }

    #[test]
    fn json_sink_emits_a_valid_array() {
        let mut buf = Vec::new();
        {
            let mut sink = JsonSink { out: Box::new(&mut buf), wrote_any: false };
            sink.begin().unwrap();
            sink.record(&sample(None)).unwrap();
            sink.record(&sample(Some("hi"))).unwrap();
            sink.end().unwrap();
        }
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn binary_sink_encodes_fixed_record() {
        let mut buf = Vec::new();
        {
            let mut sink = BinarySink { out: Box::new(&mut buf) };
            sink.record(&sample(Some("ok"))).unwrap();
        }
        assert_eq!(buf.len(), 16 + 2 + 1 + 2 + 2);
        assert_eq!(&buf[16..18], &80u16.to_be_bytes());
        assert_eq!(buf[18], 0);
        assert_eq!(&buf[19..21], &2u16.to_be_bytes());
        assert_eq!(&buf[21..23], b"ok");
    }
}
