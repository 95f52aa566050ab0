//! pcapstat-extract entry point.
//!
//! Reads the fixed capture file and writes one CSV row per IPv4 packet.
//! No flags; the filenames are compiled in.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use pcapstat::extract::extract_to_csv;

/// Capture file read by the extractor.
const CAPTURE_FILE: &str = "dump3.pcapng";

/// Tabular output consumed by pcapstat-analyze.
const OUTPUT_FILE: &str = "ddos_data.csv";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let summary = extract_to_csv(Path::new(CAPTURE_FILE), Path::new(OUTPUT_FILE))
        .with_context(|| format!("Failed to extract packet data from {CAPTURE_FILE}"))?;

    println!(
        "Wrote {} records to {} ({} frames read from {})",
        summary.records_written, OUTPUT_FILE, summary.frames_seen, CAPTURE_FILE
    );

    Ok(())
}
