//! pcapstat - Packet capture summary reporting.
//!
//! This library turns a PCAP/PCAPNG capture into a tabular CSV export and
//! renders descriptive charts from it. Two pipelines share the crate:
//!
//! - the **extractor** reads a capture file and writes one CSV row per IPv4
//!   packet (see [`extract`]),
//! - the **analyzer** loads that CSV back, computes summary statistics and
//!   renders charts into an output directory (see [`table`], [`analysis`],
//!   [`render`] and [`report`]).
//!
//! The two pipelines communicate only through the CSV file; there is no
//! shared process state.
//!
//! # Example
//!
//! ```no_run
//! use pcapstat::analysis::analyze;
//! use pcapstat::table::Table;
//!
//! fn main() -> pcapstat::Result<()> {
//!     let table = Table::load("ddos_data.csv")?;
//!     let result = analyze(&table);
//!     println!("{} packets, {} bytes", result.total_packets, result.total_traffic);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod decode;
pub mod error;
pub mod extract;
pub mod pcap;
pub mod record;
pub mod render;
pub mod report;
pub mod table;

pub use error::{Error, Result};
