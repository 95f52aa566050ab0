//! The persisted per-packet record and its tabular schema.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedPacket;
use crate::pcap::RawPacket;

/// Column names of the tabular export, in order.
pub const COLUMNS: [&str; 7] = [
    "Time",
    "Src IP",
    "Dst IP",
    "Src Port",
    "Dst Port",
    "Protocol",
    "Packet Size",
];

/// One row of the tabular export: the metadata of a single IPv4 packet.
///
/// Ports are both present (TCP/UDP) or both absent, never mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Seconds since epoch, fractional part preserved.
    #[serde(rename = "Time")]
    pub time: f64,

    #[serde(rename = "Src IP")]
    pub src_ip: String,

    #[serde(rename = "Dst IP")]
    pub dst_ip: String,

    #[serde(rename = "Src Port")]
    pub src_port: Option<u16>,

    #[serde(rename = "Dst Port")]
    pub dst_port: Option<u16>,

    /// IP protocol number (6 = TCP, 17 = UDP, ...).
    #[serde(rename = "Protocol")]
    pub protocol: u8,

    /// Total wire length of the frame in bytes.
    #[serde(rename = "Packet Size")]
    pub packet_size: u64,
}

impl PacketRecord {
    /// Build a record from a decoded frame, or `None` if the frame carries
    /// no IPv4 layer.
    pub fn from_decoded(raw: &RawPacket, decoded: &DecodedPacket) -> Option<Self> {
        let ip = decoded.ip.as_ref()?;

        let (src_port, dst_port) = match &decoded.transport {
            Some(t) => (Some(t.src_port), Some(t.dst_port)),
            None => (None, None),
        };

        Some(PacketRecord {
            time: raw.timestamp_secs(),
            src_ip: ip.src.to_string(),
            dst_ip: ip.dst.to_string(),
            src_port,
            dst_port,
            protocol: ip.protocol,
            packet_size: u64::from(raw.original_length),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{IpInfo, TransportInfo, TransportKind};

    fn raw(timestamp_us: i64, original_length: u32) -> RawPacket {
        RawPacket {
            frame_number: 1,
            timestamp_us,
            captured_length: original_length,
            original_length,
            link_type: 1,
            data: Vec::new(),
        }
    }

    fn ip_info(protocol: u8) -> IpInfo {
        IpInfo {
            src: "192.168.1.1".parse().unwrap(),
            dst: "10.0.0.1".parse().unwrap(),
            protocol,
        }
    }

    #[test]
    fn test_record_from_tcp_packet() {
        let decoded = DecodedPacket {
            ip: Some(ip_info(6)),
            transport: Some(TransportInfo {
                kind: TransportKind::Tcp,
                src_port: 12345,
                dst_port: 80,
            }),
        };

        let record = PacketRecord::from_decoded(&raw(1_500_000_000_500_000, 60), &decoded)
            .expect("IPv4 frame produces a record");

        assert!((record.time - 1_500_000_000.5).abs() < 1e-9);
        assert_eq!(record.src_ip, "192.168.1.1");
        assert_eq!(record.dst_ip, "10.0.0.1");
        assert_eq!(record.src_port, Some(12345));
        assert_eq!(record.dst_port, Some(80));
        assert_eq!(record.protocol, 6);
        assert_eq!(record.packet_size, 60);
    }

    #[test]
    fn test_record_without_transport_has_no_ports() {
        let decoded = DecodedPacket {
            ip: Some(ip_info(1)),
            transport: None,
        };

        let record = PacketRecord::from_decoded(&raw(0, 84), &decoded).unwrap();

        assert_eq!(record.src_port, None);
        assert_eq!(record.dst_port, None);
        assert_eq!(record.protocol, 1);
    }

    #[test]
    fn test_non_ip_frame_produces_no_record() {
        let decoded = DecodedPacket::default();
        assert!(PacketRecord::from_decoded(&raw(0, 42), &decoded).is_none());
    }

    #[test]
    fn test_packet_size_uses_wire_length() {
        // Truncated capture: caplen < origlen, size is the wire length
        let decoded = DecodedPacket {
            ip: Some(ip_info(17)),
            transport: None,
        };
        let mut raw = raw(0, 1500);
        raw.captured_length = 96;

        let record = PacketRecord::from_decoded(&raw, &decoded).unwrap();
        assert_eq!(record.packet_size, 1500);
    }
}
