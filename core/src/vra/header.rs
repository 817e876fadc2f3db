//! vra/header.rs
//! The fixed 20-byte VRA file header.
//!
//! Design notes:
//! - Big-endian on disk, field order fixed:
//!   `FAW "VRAF" | version | 3 reserved | file length (bytes) | CRC-32`.
//! - A file length of 0 means "ask the storage layer"; a CRC of all ones
//!   means "not computed".
//! - `decode` checks only what it needs to parse; `validate` applies the
//!   container rules.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::constants::{VRA_CRC_OFFSET, VRA_CRC_SENTINEL, VRA_FAW, VRA_HEADER_LEN, VRA_LENGTH_UNSET, VRA_VERSION};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VraHeaderError {
    #[error("buffer too short: have {have}, need {need}")]
    BufferTooShort { have: usize, need: usize },
    #[error("bad alignment word: {0:02x?}")]
    BadFaw([u8; 4]),
    #[error("unsupported VRA version {0}")]
    UnsupportedVersion(u8),
    #[error("reserved bytes are not zero: {0:02x?}")]
    ReservedNonZero([u8; 3]),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VraHeader {
    pub faw: [u8; 4],
    pub version: u8,
    pub reserved: [u8; 3],
    /// Whole file length in bytes, header included; 0 when untracked.
    pub file_length: u64,
    pub crc: u32,
}

impl Default for VraHeader {
    fn default() -> Self {
        Self {
            faw: VRA_FAW,
            version: VRA_VERSION,
            reserved: [0; 3],
            file_length: VRA_LENGTH_UNSET,
            crc: VRA_CRC_SENTINEL,
        }
    }
}

impl VraHeader {
    pub const LEN: usize = VRA_HEADER_LEN;

    #[inline]
    pub fn has_length(&self) -> bool {
        self.file_length != VRA_LENGTH_UNSET
    }

    #[inline]
    pub fn has_crc(&self) -> bool {
        self.crc != VRA_CRC_SENTINEL
    }

    pub fn encode(&self) -> [u8; VRA_HEADER_LEN] {
        let mut out = [0u8; VRA_HEADER_LEN];
        out[0..4].copy_from_slice(&self.faw); //                  0..4   alignment word
        out[4] = self.version; //                                 4      version
        out[5..8].copy_from_slice(&self.reserved); //             5..8   reserved
        BigEndian::write_u64(&mut out[8..16], self.file_length); // 8..16  file length
        BigEndian::write_u32(&mut out[VRA_CRC_OFFSET..], self.crc); // 16..20 CRC-32
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self, VraHeaderError> {
        if buf.len() < VRA_HEADER_LEN {
            return Err(VraHeaderError::BufferTooShort { have: buf.len(), need: VRA_HEADER_LEN });
        }
        let mut faw = [0u8; 4];
        faw.copy_from_slice(&buf[0..4]);
        let mut reserved = [0u8; 3];
        reserved.copy_from_slice(&buf[5..8]);
        Ok(Self {
            faw,
            version: buf[4],
            reserved,
            file_length: BigEndian::read_u64(&buf[8..16]),
            crc: BigEndian::read_u32(&buf[VRA_CRC_OFFSET..VRA_HEADER_LEN]),
        })
    }

    /// Container rules that do not depend on the storage. A recorded length
    /// below the header size is accepted; it simply covers no packets.
    pub fn validate(&self) -> Result<(), VraHeaderError> {
        if self.faw != VRA_FAW {
            return Err(VraHeaderError::BadFaw(self.faw));
        }
        if self.version != VRA_VERSION {
            return Err(VraHeaderError::UnsupportedVersion(self.version));
        }
        if self.reserved != [0; 3] {
            return Err(VraHeaderError::ReservedNonZero(self.reserved));
        }
        Ok(())
    }
}
