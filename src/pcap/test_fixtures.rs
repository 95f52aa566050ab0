//! Synthetic capture fixtures for unit tests.

/// Build a minimal Ethernet frame with the given ethertype and payload.
pub fn ethernet_frame(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]); // dst MAC
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]); // src MAC
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Build a legacy PCAP file (little endian, Ethernet link type) from
/// `(ts_sec, ts_usec, frame)` triples.
pub fn build_legacy_pcap(frames: &[(u32, u32, &[u8])]) -> Vec<u8> {
    let mut data = Vec::new();

    // Global header
    data.extend_from_slice(&[0xd4, 0xc3, 0xb2, 0xa1]); // Magic (little endian)
    data.extend_from_slice(&[0x02, 0x00]); // Version major (2)
    data.extend_from_slice(&[0x04, 0x00]); // Version minor (4)
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Thiszone
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Sigfigs
    data.extend_from_slice(&[0xff, 0xff, 0x00, 0x00]); // Snaplen (65535)
    data.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // Network (Ethernet)

    for &(ts_sec, ts_usec, frame) in frames {
        let len = frame.len() as u32;
        data.extend_from_slice(&ts_sec.to_le_bytes());
        data.extend_from_slice(&ts_usec.to_le_bytes());
        data.extend_from_slice(&len.to_le_bytes()); // caplen
        data.extend_from_slice(&len.to_le_bytes()); // origlen
        data.extend_from_slice(frame);
    }

    data
}
