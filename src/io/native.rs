//! Native `.dbto` storage format for diabeto pipelines.
//!
//! A file is a 32-byte header followed by a Postcard-encoded payload.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                        │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};

use thiserror::Error;

use crate::pipeline::{InferenceError, PipelineKind};

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a diabeto pipeline file.
pub const MAGIC: &[u8; 4] = b"DBTO";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header for the native storage format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("DBTO")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       1     Pipeline kind (0 = logistic, 1 = tree)
/// 7       1     Reserved
/// 8       4     Payload size (bytes)
/// 12      4     CRC32 checksum of payload
/// 16      4     Number of encoded features
/// 20      12    Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub kind: PipelineKind,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Width of the classifier input.
    pub num_features: u32,
}

impl FormatHeader {
    /// Create a new header with current version.
    pub fn new(kind: PipelineKind, num_features: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            kind,
            payload_size: 0,
            checksum: 0,
            num_features,
        }
    }

    /// Serialize header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        buf[6] = self.kind.to_u8();
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        buf[16..20].copy_from_slice(&self.num_features.to_le_bytes());
        buf
    }

    /// Parse header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAPipeline);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let kind = PipelineKind::from_u8(buf[6])
            .ok_or_else(|| DeserializeError::CorruptPayload(format!("invalid pipeline kind {}", buf[6])))?;

        Ok(Self {
            version_major,
            version_minor,
            kind,
            payload_size: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            checksum: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
            num_features: u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]),
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),

    /// JSON encoding error.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload does not fit the 32-bit size field.
    #[error("payload of {0} bytes is too large")]
    PayloadTooLarge(usize),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// File is not a diabeto pipeline (wrong magic).
    #[error("not a diabeto pipeline file")]
    NotAPipeline,

    /// Pipeline requires a newer format version.
    #[error("pipeline requires format {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Payload is corrupt or malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// The stored stages do not form a valid pipeline.
    #[error("invalid pipeline: {0}")]
    Invalid(#[from] InferenceError),

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),

    /// JSON decoding error.
    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file holds a different pipeline than the caller expected.
    #[error("pipeline kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: PipelineKind,
        actual: PipelineKind,
    },
}

// ============================================================================
// CRC32 Helper
// ============================================================================

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// ============================================================================
// Native Codec
// ============================================================================

/// Codec for reading and writing pipelines in native format.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl NativeCodec {
    pub fn new() -> Self {
        Self
    }

    /// Write header and payload to a writer.
    ///
    /// `payload_size` and `checksum` of `header` are filled in from `payload`.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        header: &mut FormatHeader,
        payload: &[u8],
    ) -> Result<(), SerializeError> {
        header.payload_size =
            u32::try_from(payload.len()).map_err(|_| SerializeError::PayloadTooLarge(payload.len()))?;
        header.checksum = compute_checksum(payload);

        writer.write_all(&header.to_bytes())?;
        writer.write_all(payload)?;
        Ok(())
    }

    /// Read header and payload from a reader, verifying the checksum.
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<(FormatHeader, Vec<u8>), DeserializeError> {
        let mut header_buf = [0u8; HEADER_SIZE];
        read_exact_or_truncated(reader, &mut header_buf)?;
        let header = FormatHeader::from_bytes(&header_buf)?;

        let mut payload = vec![0u8; header.payload_size as usize];
        read_exact_or_truncated(reader, &mut payload)?;

        let actual = compute_checksum(&payload);
        if actual != header.checksum {
            return Err(DeserializeError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
        Ok((header, payload))
    }

    /// Encode `payload` with postcard and prepend a header.
    pub fn serialize<T: serde::Serialize>(
        &self,
        kind: PipelineKind,
        num_features: u32,
        payload: &T,
    ) -> Result<Vec<u8>, SerializeError> {
        let payload_bytes = postcard::to_allocvec(payload)?;
        let mut header = FormatHeader::new(kind, num_features);
        let mut output = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
        self.write_to(&mut output, &mut header, &payload_bytes)?;
        Ok(output)
    }

    /// Decode a header and postcard payload from bytes.
    pub fn deserialize<T: for<'de> serde::Deserialize<'de>>(
        &self,
        bytes: &[u8],
    ) -> Result<(FormatHeader, T), DeserializeError> {
        let mut cursor = std::io::Cursor::new(bytes);
        let (header, payload_bytes) = self.read_from(&mut cursor)?;
        let payload = postcard::from_bytes(&payload_bytes)?;
        Ok((header, payload))
    }
}

/// `read_exact`, reporting how many bytes were actually available on EOF.
fn read_exact_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), DeserializeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(DeserializeError::Truncated {
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(DeserializeError::Io(e)),
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = FormatHeader {
            version_major: 1,
            version_minor: 2,
            kind: PipelineKind::Tree,
            payload_size: 12345,
            checksum: 0xDEADBEEF,
            num_features: 40,
        };

        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"DBTO");
        assert_eq!(FormatHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn header_wrong_magic() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"BSTR");
        assert!(matches!(FormatHeader::from_bytes(&buf), Err(DeserializeError::NotAPipeline)));
    }

    #[test]
    fn header_unsupported_version() {
        let mut header = FormatHeader::new(PipelineKind::Logistic, 10);
        header.version_major = 99;
        assert!(matches!(
            FormatHeader::from_bytes(&header.to_bytes()),
            Err(DeserializeError::UnsupportedVersion { major: 99, .. })
        ));
    }

    #[test]
    fn header_unknown_kind() {
        let mut bytes = FormatHeader::new(PipelineKind::Logistic, 10).to_bytes();
        bytes[6] = 9;
        assert!(matches!(
            FormatHeader::from_bytes(&bytes),
            Err(DeserializeError::CorruptPayload(_))
        ));
    }

    #[test]
    fn codec_write_read_roundtrip() {
        let codec = NativeCodec::new();
        let mut header = FormatHeader::new(PipelineKind::Logistic, 10);
        let payload = b"test payload data";

        let mut buffer = Vec::new();
        codec.write_to(&mut buffer, &mut header, payload).unwrap();

        let (read_header, read_payload) = codec.read_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(read_header.kind, PipelineKind::Logistic);
        assert_eq!(read_header.num_features, 10);
        assert_eq!(read_payload, payload);
    }

    #[test]
    fn codec_detects_corruption() {
        let codec = NativeCodec::new();
        let mut header = FormatHeader::new(PipelineKind::Tree, 5);
        let mut buffer = Vec::new();
        codec.write_to(&mut buffer, &mut header, b"some pipeline data").unwrap();

        buffer[HEADER_SIZE + 5] ^= 0xFF;
        assert!(matches!(
            codec.read_from(&mut buffer.as_slice()),
            Err(DeserializeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn codec_detects_truncation() {
        let codec = NativeCodec::new();
        let mut header = FormatHeader::new(PipelineKind::Tree, 5);
        let mut buffer = Vec::new();
        codec.write_to(&mut buffer, &mut header, b"0123456789").unwrap();
        buffer.truncate(HEADER_SIZE + 4);

        assert!(matches!(
            codec.read_from(&mut buffer.as_slice()),
            Err(DeserializeError::Truncated { expected: 10, actual: 4 })
        ));
        assert!(matches!(
            codec.read_from(&mut &buffer[..10]),
            Err(DeserializeError::Truncated { expected: HEADER_SIZE, actual: 10 })
        ));
    }
}
