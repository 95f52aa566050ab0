//! pcapstat-analyze entry point.
//!
//! Loads the extracted packet table, prints the summary and renders the
//! chart set.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcapstat::analysis::analyze;
use pcapstat::cli::AnalyzeArgs;
use pcapstat::render::{render_all, RenderConfig};
use pcapstat::report::write_summary;
use pcapstat::table::Table;

fn main() -> Result<()> {
    let args = AnalyzeArgs::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    // A missing or unreadable table aborts the run before any chart is
    // written; this is a soft exit, not a process failure
    let table = match Table::load(&args.filename) {
        Ok(table) => table,
        Err(e) => {
            println!("Error: {e}");
            return Ok(());
        }
    };

    let analysis = analyze(&table);

    let mut stdout = io::stdout();
    write_summary(&mut stdout, &table, &analysis, args.top_n)
        .context("Failed to write summary")?;

    let cfg = RenderConfig::new(args.output_dir.clone(), args.top_n);
    render_all(&table, &cfg)
        .with_context(|| format!("Failed to render charts into {}", args.output_dir.display()))?;

    println!();
    println!("Charts saved to {}", args.output_dir.display());

    Ok(())
}
