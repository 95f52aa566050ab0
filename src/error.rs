//! Error types for pcapstat.

use thiserror::Error;

/// Main error type for pcapstat operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or parsing a capture file
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Error loading the tabular packet file
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Error rendering a chart
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Error reading or writing CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to reading capture files.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Capture file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// File exists but is not a readable PCAP/PCAPNG container
    #[error("Invalid capture format: {reason}")]
    InvalidFormat { reason: String },
}

/// Errors related to loading the extracted packet table.
///
/// The analyzer distinguishes a missing file from a file that exists but
/// cannot be parsed into the expected schema; both abort the run before any
/// chart is produced.
#[derive(Error, Debug)]
pub enum TableError {
    /// Input file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// File exists but could not be parsed into the packet schema
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },
}

/// Errors related to chart rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Output directory could not be created
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A single chart failed to draw or save
    #[error("{chart}: {reason}")]
    Chart {
        chart: &'static str,
        reason: String,
    },
}

impl RenderError {
    /// Wrap a drawing-backend failure for the named chart.
    pub fn chart(chart: &'static str, err: impl std::fmt::Display) -> Self {
        RenderError::Chart {
            chart,
            reason: err.to_string(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
