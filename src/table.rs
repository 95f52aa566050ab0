//! The analyzer loader: tabular file to in-memory table.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::TableError;
use crate::record::{PacketRecord, COLUMNS};

/// One loaded row, with `Time` converted from epoch seconds to a UTC
/// timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub time: DateTime<Utc>,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    pub protocol: u8,
    pub packet_size: u64,
}

/// The extracted dataset, loaded back for analysis.
///
/// Rows keep capture order and are never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Load the table from a CSV file produced by the extractor.
    ///
    /// A missing file and an unparseable file are distinct conditions; the
    /// analyzer aborts on either without producing output.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| classify(path, e))?;

        let headers = reader.headers().map_err(|e| classify(path, e))?;
        if headers.iter().ne(COLUMNS) {
            return Err(TableError::Load {
                path: path.display().to_string(),
                reason: format!("unexpected header row: {headers:?}"),
            });
        }

        let mut rows = Vec::new();
        for (index, result) in reader.deserialize::<PacketRecord>().enumerate() {
            let record = result.map_err(|e| classify(path, e))?;
            let time = to_datetime(record.time).ok_or_else(|| TableError::Load {
                path: path.display().to_string(),
                reason: format!("unrepresentable timestamp {} at row {}", record.time, index + 1),
            })?;

            rows.push(TableRow {
                time,
                src_ip: record.src_ip,
                dst_ip: record.dst_ip,
                src_port: record.src_port,
                dst_port: record.dst_port,
                protocol: record.protocol,
                packet_size: record.packet_size,
            });
        }

        Ok(Table { rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Map a CSV error to the table error taxonomy: a missing file is reported
/// as such, everything else is a load failure.
fn classify(path: &Path, err: csv::Error) -> TableError {
    let path = path.display().to_string();
    match err.kind() {
        csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
            TableError::FileNotFound { path }
        }
        _ => TableError::Load {
            path,
            reason: err.to_string(),
        },
    }
}

/// Convert epoch seconds to a UTC timestamp, preserving sub-second
/// precision.
fn to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}
