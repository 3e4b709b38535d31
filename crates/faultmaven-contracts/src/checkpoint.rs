//! Optional integrity envelope for [`crate::StateStore`] implementors that
//! persist to a byte sink (file, blob store) rather than a JSON-native one
//! (`SPEC_FULL.md` §11). The engine's own wire format is plain JSON
//! (`spec.md` §6.3); this helper is for stores that want corruption
//! detection on top of that JSON, the way the teacher's
//! `CheckpointWithIntegrity` wraps its bincode payloads with a checksummed
//! header. Using it is optional — `StateStore` itself takes no position on
//! how bytes are framed.

use thiserror::Error;

const ENVELOPE_MAGIC: &[u8; 4] = b"FMIS";
const ENVELOPE_FORMAT_VERSION: u32 = 1;
const ENVELOPE_HEADER_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IntegrityError {
    #[error("envelope too small: {size} bytes (minimum {minimum})")]
    TooSmall { size: usize, minimum: usize },
    #[error("invalid envelope magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },
    #[error("unsupported envelope format version: found {found}, supported up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("checksum mismatch (data corruption): expected 0x{expected:08X}, computed 0x{computed:08X}")]
    ChecksumMismatch { expected: u32, computed: u32 },
    #[error("length mismatch: declared {declared} bytes, actual {actual} bytes")]
    LengthMismatch { declared: u64, actual: u64 },
}

/// Wraps a JSON-serialized `InvestigationState` payload with a checksummed
/// header so a byte-oriented store can detect corruption on read.
///
/// Layout: magic(4) + version(4) + crc32(4) + length(8) + payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateEnvelope;

impl StateEnvelope {
    #[must_use]
    pub fn wrap(payload: &[u8]) -> Vec<u8> {
        let checksum = crc32fast::hash(payload);
        let length = payload.len() as u64;
        let mut out = Vec::with_capacity(ENVELOPE_HEADER_SIZE + payload.len());
        out.extend_from_slice(ENVELOPE_MAGIC);
        out.extend_from_slice(&ENVELOPE_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&checksum.to_le_bytes());
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    pub fn unwrap(data: &[u8]) -> Result<&[u8], IntegrityError> {
        if data.len() < ENVELOPE_HEADER_SIZE {
            return Err(IntegrityError::TooSmall {
                size: data.len(),
                minimum: ENVELOPE_HEADER_SIZE,
            });
        }
        let magic: [u8; 4] = data[0..4].try_into().expect("slice is exactly 4 bytes");
        if &magic != ENVELOPE_MAGIC {
            return Err(IntegrityError::InvalidMagic {
                expected: *ENVELOPE_MAGIC,
                found: magic,
            });
        }
        let version = u32::from_le_bytes(data[4..8].try_into().expect("slice is exactly 4 bytes"));
        if version > ENVELOPE_FORMAT_VERSION {
            return Err(IntegrityError::UnsupportedVersion {
                found: version,
                supported: ENVELOPE_FORMAT_VERSION,
            });
        }
        let expected_checksum =
            u32::from_le_bytes(data[8..12].try_into().expect("slice is exactly 4 bytes"));
        let declared_length =
            u64::from_le_bytes(data[12..20].try_into().expect("slice is exactly 8 bytes"));
        let payload = &data[ENVELOPE_HEADER_SIZE..];
        if payload.len() as u64 != declared_length {
            return Err(IntegrityError::LengthMismatch {
                declared: declared_length,
                actual: payload.len() as u64,
            });
        }
        let computed_checksum = crc32fast::hash(payload);
        if computed_checksum != expected_checksum {
            return Err(IntegrityError::ChecksumMismatch {
                expected: expected_checksum,
                computed: computed_checksum,
            });
        }
        Ok(payload)
    }
}
