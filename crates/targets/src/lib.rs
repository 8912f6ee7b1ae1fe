//! ipscan6-targets — target spec grammar, address enumeration, port iteration
//!
//! Covers C1 (target generator) and C2 (port iterator): stateless,
//! O(1)-memory enumeration of the address and port space a scan covers.

pub mod error;
pub mod ports;
pub mod spec;

pub use error::TargetError;
pub use ports::{parse_port_spec, PortIter, Ports};
pub use spec::{load_spec_file, TargetGenerator, TargetSpec};
