//! The output sink contract (spec §6): `begin`/`record`/`end`, consumed by
//! whichever list/json/binary formatter the CLI wires up. The core stays
//! format-agnostic and calls only this trait.

use ipscan6_common::ScanResult;
use std::io;

pub trait OutputSink: Send {
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, result: &ScanResult) -> io::Result<()>;

    fn end(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A sink that discards every record, for `--echo-hosts` style dry runs and
/// tests that only care about the sender/receiver loops.
#[derive(Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn record(&mut self, _result: &ScanResult) -> io::Result<()> {
        Ok(())
    }
}
