//! PCAP/PCAPNG file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use pcap_parser::pcapng::Block;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError, PcapNGReader};

use super::RawPacket;
use crate::error::{CaptureError, Error};

/// Buffer size for reading capture files (64KB).
const BUFFER_SIZE: usize = 65536;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reader for PCAP and PCAPNG files, with optional gzip decompression.
///
/// Yields frames in capture order. Section headers and interface
/// description blocks update the link type; all other non-packet blocks
/// are skipped.
pub struct CaptureReader {
    inner: ReaderInner,
    frame_number: u64,
    link_type: u16,
}

impl std::fmt::Debug for CaptureReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureReader")
            .field("frame_number", &self.frame_number)
            .field("link_type", &self.link_type)
            .finish_non_exhaustive()
    }
}

enum ReaderInner {
    Legacy(LegacyPcapReader<BufReader<Box<dyn Read>>>),
    Ng(PcapNGReader<BufReader<Box<dyn Read>>>),
}

/// Outcome of consuming one block from the underlying parser.
enum Step {
    Packet {
        timestamp_us: i64,
        captured_length: u32,
        original_length: u32,
        data: Vec<u8>,
    },
    LinkType(u16),
    Skip,
    Eof,
}

impl CaptureReader {
    /// Open a capture file for reading.
    ///
    /// The container format is detected from the file magic; gzipped files
    /// (by `.gz` extension or gzip magic bytes) are decompressed
    /// transparently.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let gzipped = is_gzip_file(path)?;

        // Peek at the magic number, then reopen since the decoder stream
        // cannot be rewound.
        let mut magic = [0u8; 4];
        open_stream(path, gzipped)?
            .read_exact(&mut magic)
            .map_err(|_| {
                Error::Capture(CaptureError::InvalidFormat {
                    reason: "File too short to read magic number".to_string(),
                })
            })?;

        let reader = BufReader::with_capacity(BUFFER_SIZE, open_stream(path, gzipped)?);

        let inner = match &magic {
            // Legacy PCAP, microsecond or nanosecond, either endianness
            [0xd4, 0xc3, 0xb2, 0xa1]
            | [0xa1, 0xb2, 0xc3, 0xd4]
            | [0x4d, 0x3c, 0xb2, 0xa1]
            | [0xa1, 0xb2, 0x3c, 0x4d] => {
                let legacy = LegacyPcapReader::new(BUFFER_SIZE, reader).map_err(|e| {
                    Error::Capture(CaptureError::InvalidFormat {
                        reason: format!("Failed to parse PCAP header: {e}"),
                    })
                })?;
                ReaderInner::Legacy(legacy)
            }
            // PCAPNG section header block
            [0x0a, 0x0d, 0x0d, 0x0a] => {
                let ng = PcapNGReader::new(BUFFER_SIZE, reader).map_err(|e| {
                    Error::Capture(CaptureError::InvalidFormat {
                        reason: format!("Failed to parse PCAPNG header: {e}"),
                    })
                })?;
                ReaderInner::Ng(ng)
            }
            _ => {
                return Err(Error::Capture(CaptureError::InvalidFormat {
                    reason: format!("Unknown magic number: {magic:02x?}"),
                }))
            }
        };

        Ok(Self {
            inner,
            frame_number: 0,
            // Default to Ethernet until a header block says otherwise
            link_type: 1,
        })
    }

    /// Get the link type of the capture.
    pub fn link_type(&self) -> u16 {
        self.link_type
    }

    /// Get the number of frames read so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_number
    }

    /// Read the next frame, or `None` at end of file.
    pub fn next_packet(&mut self) -> Result<Option<RawPacket>, Error> {
        loop {
            let step = match &mut self.inner {
                ReaderInner::Legacy(reader) => read_step(reader)?,
                ReaderInner::Ng(reader) => read_step(reader)?,
            };

            match step {
                Step::Packet {
                    timestamp_us,
                    captured_length,
                    original_length,
                    data,
                } => {
                    self.frame_number += 1;
                    return Ok(Some(RawPacket {
                        frame_number: self.frame_number,
                        timestamp_us,
                        captured_length,
                        original_length,
                        link_type: self.link_type,
                        data,
                    }));
                }
                Step::LinkType(link_type) => self.link_type = link_type,
                Step::Skip => {}
                Step::Eof => return Ok(None),
            }
        }
    }
}

/// Consume one block from the parser and classify it.
fn read_step<R: PcapReaderIterator>(reader: &mut R) -> Result<Step, Error> {
    match reader.next() {
        Ok((offset, block)) => {
            let step = match block {
                PcapBlockOwned::LegacyHeader(header) => {
                    Step::LinkType(header.network.0 as u16)
                }
                PcapBlockOwned::Legacy(packet) => Step::Packet {
                    timestamp_us: i64::from(packet.ts_sec) * 1_000_000
                        + i64::from(packet.ts_usec),
                    captured_length: packet.caplen,
                    original_length: packet.origlen,
                    data: packet.data.to_vec(),
                },
                PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                    Step::LinkType(idb.linktype.0 as u16)
                }
                PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => Step::Packet {
                    // Interface time units; microseconds unless if_tsresol
                    // says otherwise
                    timestamp_us: (i64::from(epb.ts_high) << 32) | i64::from(epb.ts_low),
                    captured_length: epb.caplen,
                    original_length: epb.origlen,
                    data: epb.data.to_vec(),
                },
                PcapBlockOwned::NG(Block::SimplePacket(spb)) => Step::Packet {
                    // No timestamp in simple packet blocks
                    timestamp_us: 0,
                    captured_length: spb.data.len() as u32,
                    original_length: spb.origlen,
                    data: spb.data.to_vec(),
                },
                _ => Step::Skip,
            };
            reader.consume(offset);
            Ok(step)
        }
        Err(PcapError::Eof) => Ok(Step::Eof),
        Err(PcapError::Incomplete(_)) => {
            reader.refill().map_err(|e| {
                Error::Capture(CaptureError::InvalidFormat {
                    reason: format!("Refill error: {e}"),
                })
            })?;
            Ok(Step::Skip)
        }
        Err(e) => Err(Error::Capture(CaptureError::InvalidFormat {
            reason: format!("Parse error: {e}"),
        })),
    }
}

/// Open the raw byte stream, wrapping with a gzip decoder when needed.
fn open_stream(path: &Path, gzipped: bool) -> Result<Box<dyn Read>, Error> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::Capture(CaptureError::FileNotFound {
                path: path.display().to_string(),
            })
        } else {
            Error::Io(e)
        }
    })?;

    if gzipped {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Check if a file is gzipped by extension or magic bytes.
fn is_gzip_file(path: &Path) -> Result<bool, Error> {
    if is_gzip_extension(path) {
        return Ok(true);
    }

    let mut stream = open_stream(path, false)?;
    let mut magic = [0u8; 2];
    match stream.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        // File too short to be gzipped
        Err(_) => Ok(false),
    }
}

/// Check if a path appears to be a gzip file by extension only.
pub fn is_gzip_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|f| f.to_str())
        .map(|f| f.to_lowercase().ends_with(".gz"))
        .unwrap_or(false)
}

/// Iterator adapter for CaptureReader.
impl Iterator for CaptureReader {
    type Item = Result<RawPacket, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcap::test_fixtures::{build_legacy_pcap, ethernet_frame};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_gzip_by_extension() {
        assert!(is_gzip_extension("test.pcap.gz"));
        assert!(is_gzip_extension("TEST.PCAPNG.GZ"));
        assert!(!is_gzip_extension("test.pcap"));
        assert!(!is_gzip_extension("test.pcapng"));
    }

    #[test]
    fn test_detect_gzip_by_magic_bytes() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&GZIP_MAGIC).unwrap();
        temp.write_all(&[0x00, 0x00]).unwrap();
        temp.flush().unwrap();

        assert!(is_gzip_file(temp.path()).unwrap());
    }

    #[test]
    fn test_open_missing_file() {
        let err = CaptureReader::open("no/such/capture.pcap").unwrap_err();
        assert!(matches!(
            err,
            Error::Capture(CaptureError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_open_garbage_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"this is not a capture file").unwrap();
        temp.flush().unwrap();

        let err = CaptureReader::open(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::Capture(CaptureError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_read_legacy_pcap() {
        let frame = ethernet_frame(0x0800, &[0xde, 0xad]);
        let pcap = build_legacy_pcap(&[(1_000_000_000, 250_000, &frame)]);

        let mut temp = NamedTempFile::with_suffix(".pcap").unwrap();
        temp.write_all(&pcap).unwrap();
        temp.flush().unwrap();

        let mut reader = CaptureReader::open(temp.path()).unwrap();
        let packet = reader.next_packet().unwrap().unwrap();

        assert_eq!(packet.frame_number, 1);
        assert_eq!(packet.timestamp_us, 1_000_000_000_250_000);
        assert_eq!(packet.link_type, 1);
        assert_eq!(packet.data, frame);
        assert_eq!(packet.original_length as usize, frame.len());
        assert!(!packet.is_truncated());

        assert!(reader.next_packet().unwrap().is_none());
        assert_eq!(reader.frame_count(), 1);
    }

    #[test]
    fn test_read_gzipped_pcap() {
        let frame = ethernet_frame(0x0800, &[]);
        let pcap = build_legacy_pcap(&[(1_700_000_000, 0, &frame)]);

        let temp = NamedTempFile::with_suffix(".pcap.gz").unwrap();
        {
            let file = File::create(temp.path()).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(&pcap).unwrap();
            encoder.finish().unwrap();
        }

        let mut reader = CaptureReader::open(temp.path()).unwrap();
        let packet = reader.next_packet().unwrap().unwrap();
        assert_eq!(packet.timestamp_us, 1_700_000_000_000_000);
        assert!(reader.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_timestamp_secs() {
        let frame = ethernet_frame(0x0800, &[]);
        let pcap = build_legacy_pcap(&[(1_000, 500_000, &frame)]);

        let mut temp = NamedTempFile::with_suffix(".pcap").unwrap();
        temp.write_all(&pcap).unwrap();
        temp.flush().unwrap();

        let mut reader = CaptureReader::open(temp.path()).unwrap();
        let packet = reader.next_packet().unwrap().unwrap();
        assert!((packet.timestamp_secs() - 1000.5).abs() < 1e-9);
    }
}
