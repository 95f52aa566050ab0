//! The extractor pass: capture file to tabular export.

use std::path::Path;

use tracing::{debug, info};

use crate::decode::decode;
use crate::error::Result;
use crate::pcap::CaptureReader;
use crate::record::{PacketRecord, COLUMNS};

/// Outcome of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Frames read from the capture, including skipped ones.
    pub frames_seen: u64,

    /// Records written to the tabular output (one per IPv4 frame).
    pub records_written: u64,
}

/// Extract per-packet metadata from `capture` into a CSV file at `output`.
///
/// One row is written per frame with an IPv4 layer, in capture order;
/// frames without one are skipped silently. Any existing file at `output`
/// is overwritten. The header row is written even when no frame qualifies.
pub fn extract_to_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    capture: P,
    output: Q,
) -> Result<ExtractSummary> {
    let capture = capture.as_ref();
    let output = output.as_ref();

    let mut reader = CaptureReader::open(capture)?;

    // Header is written up front so the serialized rows do not repeat it
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output)?;
    writer.write_record(COLUMNS)?;

    let mut summary = ExtractSummary {
        frames_seen: 0,
        records_written: 0,
    };

    while let Some(raw) = reader.next_packet()? {
        summary.frames_seen += 1;

        let decoded = decode(raw.link_type, &raw.data);
        match PacketRecord::from_decoded(&raw, &decoded) {
            Some(record) => {
                writer.serialize(&record)?;
                summary.records_written += 1;
            }
            None => {
                debug!(frame = raw.frame_number, "skipping frame without IPv4 layer");
            }
        }
    }

    writer.flush()?;

    info!(
        frames = summary.frames_seen,
        records = summary.records_written,
        output = %output.display(),
        "extraction complete"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcap::test_fixtures::{build_legacy_pcap, ethernet_frame};
    use std::io::Write;
    use tempfile::tempdir;

    /// Ethernet/IPv4/TCP frame with the given total IP length padding.
    fn tcp_frame(src_port: u16, dst_port: u16) -> Vec<u8> {
        let mut payload = vec![
            0x45, 0x00, 0x00, 0x28, // Version/IHL, TOS, total length 40
            0x00, 0x01, 0x00, 0x00, // ID, flags
            0x40, 0x06, 0x00, 0x00, // TTL, TCP, checksum
            192, 168, 0, 1, // Src IP
            192, 168, 0, 2, // Dst IP
        ];
        payload.extend_from_slice(&src_port.to_be_bytes());
        payload.extend_from_slice(&dst_port.to_be_bytes());
        payload.extend_from_slice(&[
            0x00, 0x00, 0x00, 0x01, // Seq
            0x00, 0x00, 0x00, 0x00, // Ack
            0x50, 0x02, 0xff, 0xff, // Offset, SYN, window
            0x00, 0x00, 0x00, 0x00, // Checksum, urgent
        ]);
        ethernet_frame(0x0800, &payload)
    }

    fn arp_frame() -> Vec<u8> {
        ethernet_frame(0x0806, &[0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01])
    }

    #[test]
    fn test_extract_skips_non_ip_frames() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("capture.pcap");
        let output = dir.path().join("packets.csv");

        let tcp = tcp_frame(12345, 80);
        let arp = arp_frame();
        let pcap = build_legacy_pcap(&[
            (1000, 0, &tcp),
            (1000, 500_000, &arp),
            (1001, 0, &tcp),
        ]);
        std::fs::File::create(&capture)
            .unwrap()
            .write_all(&pcap)
            .unwrap();

        let summary = extract_to_csv(&capture, &output).unwrap();

        assert_eq!(summary.frames_seen, 3);
        assert_eq!(summary.records_written, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Time,Src IP,Dst IP,Src Port,Dst Port,Protocol,Packet Size"
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_extract_empty_capture_writes_header() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("empty.pcap");
        let output = dir.path().join("packets.csv");

        let pcap = build_legacy_pcap(&[]);
        std::fs::File::create(&capture)
            .unwrap()
            .write_all(&pcap)
            .unwrap();

        let summary = extract_to_csv(&capture, &output).unwrap();

        assert_eq!(summary.frames_seen, 0);
        assert_eq!(summary.records_written, 0);

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            content.trim_end(),
            "Time,Src IP,Dst IP,Src Port,Dst Port,Protocol,Packet Size"
        );
    }

    #[test]
    fn test_extract_missing_capture_fails() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("packets.csv");

        let result = extract_to_csv(dir.path().join("missing.pcap"), &output);

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_extract_row_contents() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("capture.pcap");
        let output = dir.path().join("packets.csv");

        let tcp = tcp_frame(4444, 443);
        let pcap = build_legacy_pcap(&[(1_600_000_000, 250_000, &tcp)]);
        std::fs::File::create(&capture)
            .unwrap()
            .write_all(&pcap)
            .unwrap();

        extract_to_csv(&capture, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert_eq!(
            row,
            format!("1600000000.25,192.168.0.1,192.168.0.2,4444,443,6,{}", tcp.len())
        );
    }
}
