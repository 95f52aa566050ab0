//! Link/network/transport header decoding.
//!
//! Decodes a raw Ethernet frame just far enough for the extractor: the IPv4
//! addresses and protocol number, plus TCP/UDP ports when present. The
//! result is a small variant type; any layer that is absent, truncated or
//! malformed simply leaves the corresponding field `None` (decode-skip, not
//! an error).

use std::net::Ipv4Addr;

use etherparse::{Ethernet2HeaderSlice, Ipv4HeaderSlice, TcpHeaderSlice, UdpHeaderSlice};

/// Link type constant for Ethernet.
pub const LINKTYPE_ETHERNET: u16 = 1;

/// Well-known EtherTypes.
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const VLAN: u16 = 0x8100;
    pub const QINQ: u16 = 0x88A8;
}

/// IP protocol numbers with transport-layer ports.
pub mod ip_proto {
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

/// Decoded view of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedPacket {
    /// IPv4 layer, if the frame carries one.
    pub ip: Option<IpInfo>,

    /// Transport layer, if the IP payload is a parseable TCP or UDP header.
    pub transport: Option<TransportInfo>,
}

/// Fields extracted from the IPv4 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpInfo {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    /// IP protocol number (6 = TCP, 17 = UDP, ...).
    pub protocol: u8,
}

/// Fields extracted from the transport header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportInfo {
    pub kind: TransportKind,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Transport layers that carry port numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Tcp,
    Udp,
}

/// Decode one frame.
///
/// Non-Ethernet link types and frames without an IPv4 layer decode to an
/// empty result. The transport field is populated only for TCP and UDP;
/// ports are therefore always both present or both absent.
pub fn decode(link_type: u16, data: &[u8]) -> DecodedPacket {
    if link_type != LINKTYPE_ETHERNET {
        return DecodedPacket::default();
    }

    let eth = match Ethernet2HeaderSlice::from_slice(data) {
        Ok(eth) => eth,
        Err(_) => return DecodedPacket::default(),
    };

    let mut ether_type = eth.ether_type().0;
    let mut rest = &data[eth.slice().len()..];

    // Unwrap up to two VLAN tags (802.1Q, QinQ outer + inner). The tag is
    // 4 bytes: TCI, then the inner EtherType.
    for _ in 0..2 {
        if ether_type != ethertype::VLAN && ether_type != ethertype::QINQ {
            break;
        }
        if rest.len() < 4 {
            return DecodedPacket::default();
        }
        ether_type = u16::from_be_bytes([rest[2], rest[3]]);
        rest = &rest[4..];
    }

    if ether_type != ethertype::IPV4 {
        return DecodedPacket::default();
    }

    let ipv4 = match Ipv4HeaderSlice::from_slice(rest) {
        Ok(ipv4) => ipv4,
        Err(_) => return DecodedPacket::default(),
    };

    let ip = IpInfo {
        src: ipv4.source_addr(),
        dst: ipv4.destination_addr(),
        protocol: ipv4.protocol().0,
    };

    let payload = &rest[ipv4.slice().len()..];
    let transport = match ip.protocol {
        ip_proto::TCP => TcpHeaderSlice::from_slice(payload).ok().map(|tcp| TransportInfo {
            kind: TransportKind::Tcp,
            src_port: tcp.source_port(),
            dst_port: tcp.destination_port(),
        }),
        ip_proto::UDP => UdpHeaderSlice::from_slice(payload).ok().map(|udp| TransportInfo {
            kind: TransportKind::Udp,
            src_port: udp.source_port(),
            dst_port: udp.destination_port(),
        }),
        _ => None,
    };

    DecodedPacket {
        ip: Some(ip),
        transport,
    }
}
