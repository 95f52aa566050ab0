//! Textual summary output.

use std::fmt::Display;
use std::io::{self, Write};

use crate::analysis::AnalysisResult;
use crate::table::Table;

/// Number of leading rows echoed in the summary.
const PREVIEW_ROWS: usize = 5;

/// Write the fixed-structure summary to `out`.
///
/// `top_n` is the configured display value and is only echoed in the map
/// labels; the maps themselves are bounded by
/// [`crate::analysis::SUMMARY_TOP_N`].
pub fn write_summary<W: Write>(
    out: &mut W,
    table: &Table,
    analysis: &AnalysisResult,
    top_n: usize,
) -> io::Result<()> {
    writeln!(out, "Dataset: {} rows x 7 columns", table.len())?;
    writeln!(out, "Columns:")?;
    writeln!(out, "  Time         datetime (UTC)")?;
    writeln!(out, "  Src IP       string")?;
    writeln!(out, "  Dst IP       string")?;
    writeln!(out, "  Src Port     integer (nullable)")?;
    writeln!(out, "  Dst Port     integer (nullable)")?;
    writeln!(out, "  Protocol     integer")?;
    writeln!(out, "  Packet Size  integer")?;
    writeln!(out)?;

    writeln!(out, "First {PREVIEW_ROWS} rows:")?;
    for row in table.rows.iter().take(PREVIEW_ROWS) {
        writeln!(
            out,
            "  {}  {}:{} -> {}:{}  proto {}  {} bytes",
            row.time.format("%Y-%m-%d %H:%M:%S%.3f"),
            row.src_ip,
            fmt_port(row.src_port),
            row.dst_ip,
            fmt_port(row.dst_port),
            row.protocol,
            row.packet_size,
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Total packets: {}", analysis.total_packets)?;
    writeln!(out, "Total traffic: {} bytes", analysis.total_traffic)?;
    writeln!(out)?;

    writeln!(out, "Top {top_n} source IPs: {}", fmt_counts(&analysis.top_src_ips))?;
    writeln!(
        out,
        "Top {top_n} destination IPs: {}",
        fmt_counts(&analysis.top_dst_ips)
    )?;
    writeln!(
        out,
        "Top {top_n} source ports: {}",
        fmt_counts(&analysis.top_src_ports)
    )?;
    writeln!(
        out,
        "Top {top_n} destination ports: {}",
        fmt_counts(&analysis.top_dst_ports)
    )?;
    writeln!(
        out,
        "Packets per protocol: {}",
        fmt_counts(&analysis.protocol_counts)
    )?;

    Ok(())
}

fn fmt_port(port: Option<u16>) -> String {
    match port {
        Some(port) => port.to_string(),
        None => "-".to_string(),
    }
}

fn fmt_counts<T: Display>(counts: &[(T, u64)]) -> String {
    if counts.is_empty() {
        return "(none)".to_string();
    }
    counts
        .iter()
        .map(|(value, count)| format!("{value} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::table::TableRow;
    use chrono::{TimeZone, Utc};

    fn sample_table() -> Table {
        let row = |src_ip: &str, src_port, protocol, size| TableRow {
            time: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            src_ip: src_ip.to_string(),
            dst_ip: "10.0.0.1".to_string(),
            src_port,
            dst_port: src_port.map(|_| 80),
            protocol,
            packet_size: size,
        };
        Table {
            rows: vec![
                row("1.1.1.1", Some(4444), 6, 100),
                row("1.1.1.1", Some(4444), 6, 200),
                row("2.2.2.2", None, 1, 300),
            ],
        }
    }

    #[test]
    fn test_summary_structure() {
        let table = sample_table();
        let analysis = analyze(&table);

        let mut out = Vec::new();
        write_summary(&mut out, &table, &analysis, 10).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Dataset: 3 rows x 7 columns"));
        assert!(text.contains("Total packets: 3"));
        assert!(text.contains("Total traffic: 600 bytes"));
        assert!(text.contains("Top 10 source IPs: 1.1.1.1 (2), 2.2.2.2 (1)"));
        assert!(text.contains("Top 10 source ports: 4444 (2)"));
        assert!(text.contains("Packets per protocol: 6 (2), 1 (1)"));
    }

    #[test]
    fn test_summary_echoes_configured_top_n() {
        let table = sample_table();
        let analysis = analyze(&table);

        let mut out = Vec::new();
        write_summary(&mut out, &table, &analysis, 3).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Top 3 source IPs:"));
        assert!(text.contains("Top 3 destination ports:"));
    }

    #[test]
    fn test_summary_previews_at_most_five_rows() {
        let mut table = sample_table();
        let extra = table.rows[0].clone();
        table.rows.extend(std::iter::repeat(extra).take(10));
        let analysis = analyze(&table);

        let mut out = Vec::new();
        write_summary(&mut out, &table, &analysis, 10).unwrap();
        let text = String::from_utf8(out).unwrap();

        let preview_lines = text
            .lines()
            .filter(|line| line.contains(" -> "))
            .count();
        assert_eq!(preview_lines, 5);
    }

    #[test]
    fn test_summary_on_empty_table() {
        let table = Table::default();
        let analysis = analyze(&table);

        let mut out = Vec::new();
        write_summary(&mut out, &table, &analysis, 10).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Dataset: 0 rows x 7 columns"));
        assert!(text.contains("Top 10 source IPs: (none)"));
    }

    #[test]
    fn test_absent_ports_render_as_dash() {
        let table = sample_table();
        let analysis = analyze(&table);

        let mut out = Vec::new();
        write_summary(&mut out, &table, &analysis, 10).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("2.2.2.2:- -> 10.0.0.1:-"));
    }
}
