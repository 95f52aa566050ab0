//! The aggregator: summary statistics over the loaded table.

use std::collections::HashMap;
use std::hash::Hash;

use crate::table::Table;

/// Number of entries in the summary top-N maps.
///
/// This is a fixed constant, deliberately independent of the CLI `--top_n`
/// (which only scales the charts and the printed labels); see
/// [`crate::cli::DEFAULT_CHART_TOP_N`].
pub const SUMMARY_TOP_N: usize = 10;

/// Derived statistics, computed fresh on each analyzer run. Never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Row count of the table.
    pub total_packets: u64,

    /// Exact sum of the packet sizes, in bytes.
    pub total_traffic: u64,

    /// Top-[`SUMMARY_TOP_N`] source IPs by packet count, descending.
    pub top_src_ips: Vec<(String, u64)>,

    /// Top-[`SUMMARY_TOP_N`] destination IPs by packet count, descending.
    pub top_dst_ips: Vec<(String, u64)>,

    /// Top-[`SUMMARY_TOP_N`] source ports by packet count, descending.
    pub top_src_ports: Vec<(u16, u64)>,

    /// Top-[`SUMMARY_TOP_N`] destination ports by packet count, descending.
    pub top_dst_ports: Vec<(u16, u64)>,

    /// Full frequency map over protocol numbers (not truncated).
    pub protocol_counts: Vec<(u8, u64)>,
}

/// Count occurrences of each distinct value, descending by count.
///
/// Ties are broken by first-encountered order, so the result is fully
/// deterministic for a given input sequence.
pub fn value_counts<T, I>(values: I) -> Vec<(T, u64)>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (u64, usize)> = HashMap::new();
    for (index, value) in values.into_iter().enumerate() {
        let entry = counts.entry(value).or_insert((0, index));
        entry.0 += 1;
    }

    let mut ranked: Vec<(T, u64, usize)> = counts
        .into_iter()
        .map(|(value, (count, first_seen))| (value, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked.into_iter().map(|(value, count, _)| (value, count)).collect()
}

/// [`value_counts`] truncated to the `n` most frequent values.
pub fn top_n<T, I>(values: I, n: usize) -> Vec<(T, u64)>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts = value_counts(values);
    counts.truncate(n);
    counts
}

/// Compute the analysis result for a loaded table.
///
/// Pure function: no side effects, no I/O.
pub fn analyze(table: &Table) -> AnalysisResult {
    let rows = &table.rows;

    AnalysisResult {
        total_packets: rows.len() as u64,
        total_traffic: rows.iter().map(|r| r.packet_size).sum(),
        top_src_ips: top_n(rows.iter().map(|r| r.src_ip.clone()), SUMMARY_TOP_N),
        top_dst_ips: top_n(rows.iter().map(|r| r.dst_ip.clone()), SUMMARY_TOP_N),
        top_src_ports: top_n(rows.iter().filter_map(|r| r.src_port), SUMMARY_TOP_N),
        top_dst_ports: top_n(rows.iter().filter_map(|r| r.dst_port), SUMMARY_TOP_N),
        protocol_counts: value_counts(rows.iter().map(|r| r.protocol)),
    }
}
