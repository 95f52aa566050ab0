//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Default number of top values shown in charts and labels.
///
/// This is only the default for `--top_n`; the printed summary maps are
/// bounded by the separate [`crate::analysis::SUMMARY_TOP_N`] constant.
pub const DEFAULT_CHART_TOP_N: usize = 10;

/// Analyze an extracted packet table and render traffic charts.
#[derive(Parser, Debug)]
#[command(name = "pcapstat-analyze")]
#[command(author, version, about, long_about = None)]
pub struct AnalyzeArgs {
    /// CSV file produced by pcapstat-extract
    #[arg(value_name = "FILENAME")]
    pub filename: PathBuf,

    /// Number of top values to display
    #[arg(long = "top_n", value_name = "N", default_value_t = DEFAULT_CHART_TOP_N)]
    pub top_n: usize,

    /// Directory for rendered charts (created if missing)
    #[arg(long = "output_dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
