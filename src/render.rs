//! Chart rendering.
//!
//! Every chart takes an explicit [`RenderConfig`] so repeated invocations
//! (and tests) cannot leak state between renders. [`render_all`] creates
//! the output directory idempotently and draws the full chart set; each
//! chart call is independently failable and nothing is retried.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;

use crate::analysis::top_n;
use crate::error::RenderError;
use crate::table::Table;

/// Chart file names, in render order.
pub const CHART_FILES: [&str; 6] = [
    TIME_CHART,
    SRC_IP_CHART,
    DST_IP_CHART,
    SRC_PORT_CHART,
    DST_PORT_CHART,
    SIZE_CHART,
];

pub const TIME_CHART: &str = "time_distribution.png";
pub const SRC_IP_CHART: &str = "src_ip_distribution.png";
pub const DST_IP_CHART: &str = "dst_ip_distribution.png";
pub const SRC_PORT_CHART: &str = "src_port_distribution.png";
pub const DST_PORT_CHART: &str = "dst_port_distribution.png";
pub const SIZE_CHART: &str = "packet_size_distribution.png";

/// Number of bins in the packet-size histogram.
pub const SIZE_BINS: usize = 50;

/// Bar fill for the top-N distribution charts.
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

/// Bar fill for the packet-size histogram.
const CORAL: RGBColor = RGBColor(255, 127, 80);

/// Per-call rendering context.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Directory the chart files are written into.
    pub output_dir: PathBuf,

    /// Number of bars in the top-N charts.
    pub top_n: usize,

    /// Chart width in pixels.
    pub width: u32,

    /// Chart height in pixels.
    pub height: u32,
}

impl RenderConfig {
    pub fn new(output_dir: impl Into<PathBuf>, top_n: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            top_n,
            width: 1000,
            height: 600,
        }
    }
}

/// Render the full chart set into the configured output directory.
///
/// The directory is created first (a no-op if it already exists); any
/// chart failure aborts the run with that chart's error.
pub fn render_all(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    fs::create_dir_all(&cfg.output_dir).map_err(|source| RenderError::CreateDir {
        path: cfg.output_dir.display().to_string(),
        source,
    })?;

    time_distribution(table, cfg)?;
    src_ip_distribution(table, cfg)?;
    dst_ip_distribution(table, cfg)?;
    src_port_distribution(table, cfg)?;
    dst_port_distribution(table, cfg)?;
    packet_size_distribution(table, cfg)?;

    Ok(())
}

/// Packet count per 1-second bucket over the observed time range.
///
/// Seconds with no packets inside the observed min..max range are included
/// with a zero count, so the plotted series has no gaps.
pub fn time_series_buckets(table: &Table) -> Vec<(DateTime<Utc>, u64)> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for row in &table.rows {
        *counts.entry(row.time.timestamp()).or_insert(0) += 1;
    }

    let (Some(&min), Some(&max)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    (min..=max)
        .filter_map(|sec| {
            DateTime::from_timestamp(sec, 0)
                .map(|time| (time, counts.get(&sec).copied().unwrap_or(0)))
        })
        .collect()
}

/// Line chart of packet counts per second.
pub fn time_distribution(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    let buckets = time_series_buckets(table);
    let path = cfg.output_dir.join(TIME_CHART);

    let (start, end) = match (buckets.first(), buckets.last()) {
        (Some(&(start, _)), Some(&(end, _))) if start != end => (start, end),
        (Some(&(start, _)), _) => (start, start + Duration::seconds(1)),
        _ => (
            DateTime::<Utc>::UNIX_EPOCH,
            DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1),
        ),
    };
    let y_max = buckets.iter().map(|&(_, count)| count).max().unwrap_or(0);

    let root = BitMapBackend::new(&path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RenderError::chart(TIME_CHART, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Packets over time", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(start..end, 0u64..y_max + 1)
        .map_err(|e| RenderError::chart(TIME_CHART, e))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Packet count")
        .x_label_formatter(&|time: &DateTime<Utc>| time.format("%H:%M:%S").to_string())
        .draw()
        .map_err(|e| RenderError::chart(TIME_CHART, e))?;

    chart
        .draw_series(LineSeries::new(
            buckets.iter().cloned(),
            SKY_BLUE.stroke_width(2),
        ))
        .map_err(|e| RenderError::chart(TIME_CHART, e))?;
    chart
        .draw_series(
            buckets
                .iter()
                .map(|&(time, count)| Circle::new((time, count), 2, SKY_BLUE.filled())),
        )
        .map_err(|e| RenderError::chart(TIME_CHART, e))?;

    root.present().map_err(|e| RenderError::chart(TIME_CHART, e))
}

/// Bar chart of the top-`top_n` source IPs.
pub fn src_ip_distribution(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    let entries = top_n(table.rows.iter().map(|r| r.src_ip.clone()), cfg.top_n);
    bar_chart(
        &cfg.output_dir.join(SRC_IP_CHART),
        SRC_IP_CHART,
        &format!("Top {} source IPs", cfg.top_n),
        "Source IP",
        &entries,
        cfg,
    )
}

/// Bar chart of the top-`top_n` destination IPs.
pub fn dst_ip_distribution(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    let entries = top_n(table.rows.iter().map(|r| r.dst_ip.clone()), cfg.top_n);
    bar_chart(
        &cfg.output_dir.join(DST_IP_CHART),
        DST_IP_CHART,
        &format!("Top {} destination IPs", cfg.top_n),
        "Destination IP",
        &entries,
        cfg,
    )
}

/// Bar chart of the top-`top_n` source ports.
pub fn src_port_distribution(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    let entries: Vec<(String, u64)> = top_n(table.rows.iter().filter_map(|r| r.src_port), cfg.top_n)
        .into_iter()
        .map(|(port, count)| (port.to_string(), count))
        .collect();
    bar_chart(
        &cfg.output_dir.join(SRC_PORT_CHART),
        SRC_PORT_CHART,
        &format!("Top {} source ports", cfg.top_n),
        "Source port",
        &entries,
        cfg,
    )
}

/// Bar chart of the top-`top_n` destination ports.
pub fn dst_port_distribution(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    let entries: Vec<(String, u64)> = top_n(table.rows.iter().filter_map(|r| r.dst_port), cfg.top_n)
        .into_iter()
        .map(|(port, count)| (port.to_string(), count))
        .collect();
    bar_chart(
        &cfg.output_dir.join(DST_PORT_CHART),
        DST_PORT_CHART,
        &format!("Top {} destination ports", cfg.top_n),
        "Destination port",
        &entries,
        cfg,
    )
}

/// Histogram of packet sizes over [`SIZE_BINS`] fixed-width bins spanning
/// the observed min..max.
pub fn packet_size_distribution(table: &Table, cfg: &RenderConfig) -> Result<(), RenderError> {
    let sizes: Vec<u64> = table.rows.iter().map(|r| r.packet_size).collect();
    let path = cfg.output_dir.join(SIZE_CHART);

    let min = sizes.iter().min().copied().unwrap_or(0) as f64;
    let max = sizes.iter().max().copied().unwrap_or(0) as f64;
    let span = (max - min).max(1.0);
    let bin_width = span / SIZE_BINS as f64;

    let mut bins = [0u64; SIZE_BINS];
    for &size in &sizes {
        let index = (((size as f64 - min) / bin_width) as usize).min(SIZE_BINS - 1);
        bins[index] += 1;
    }
    let y_max = bins.iter().copied().max().unwrap_or(0);

    let root = BitMapBackend::new(&path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RenderError::chart(SIZE_CHART, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Packet size distribution", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(min..min + span, 0u64..y_max + 1)
        .map_err(|e| RenderError::chart(SIZE_CHART, e))?;

    chart
        .configure_mesh()
        .x_desc("Packet size (bytes)")
        .y_desc("Packet count")
        .draw()
        .map_err(|e| RenderError::chart(SIZE_CHART, e))?;

    chart
        .draw_series(bins.iter().enumerate().filter(|(_, &count)| count > 0).map(
            |(index, &count)| {
                let x0 = min + index as f64 * bin_width;
                Rectangle::new([(x0, 0), (x0 + bin_width, count)], CORAL.filled())
            },
        ))
        .map_err(|e| RenderError::chart(SIZE_CHART, e))?;

    root.present().map_err(|e| RenderError::chart(SIZE_CHART, e))
}

/// Draw a descending bar chart of labeled counts.
fn bar_chart(
    path: &Path,
    chart_name: &'static str,
    title: &str,
    x_desc: &str,
    entries: &[(String, u64)],
    cfg: &RenderConfig,
) -> Result<(), RenderError> {
    let bars = entries.len().max(1) as u32;
    let y_max = entries.iter().map(|&(_, count)| count).max().unwrap_or(0);

    let root = BitMapBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RenderError::chart(chart_name, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..bars).into_segmented(), 0u64..y_max + 1)
        .map_err(|e| RenderError::chart(chart_name, e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Packet count")
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) => entries
                .get(*index as usize)
                .map(|(label, _)| label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| RenderError::chart(chart_name, e))?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(SKY_BLUE.filled())
                .margin(10)
                .data(
                    entries
                        .iter()
                        .enumerate()
                        .map(|(index, &(_, count))| (index as u32, count)),
                ),
        )
        .map_err(|e| RenderError::chart(chart_name, e))?;

    root.present().map_err(|e| RenderError::chart(chart_name, e))
}
