//! vra/crc.rs
//! CRC-32 of a VRA file.
//!
//! Design notes:
//! - Reflected update with polynomial 0xEDB88320, register starting at 0,
//!   no final XOR.
//! - Coverage: header bytes 0..16 (the CRC field itself is skipped), then
//!   bytes 20..end read back in 4 KiB chunks.
//! - The final register is bit-reversed with a five-stage swap network.
//! - `crc32fast` runs the table/SIMD update. Its state is the complement of
//!   the raw register, so the register starts at 0 by seeding the state
//!   with all ones, and `!finalize()` hands back the raw register.

use std::io::{self, Read, Seek, SeekFrom};

use crc32fast::Hasher;

use crate::constants::{CRC_CHUNK_SIZE, VRA_CRC_OFFSET, VRA_HEADER_LEN};

/// Reverses the bit order of `x`: swap adjacent bits, pairs, nibbles,
/// bytes, then half-words.
#[inline]
pub const fn reverse_bits_32(x: u32) -> u32 {
    let x = ((x >> 1) & 0x5555_5555) | ((x & 0x5555_5555) << 1);
    let x = ((x >> 2) & 0x3333_3333) | ((x & 0x3333_3333) << 2);
    let x = ((x >> 4) & 0x0F0F_0F0F) | ((x & 0x0F0F_0F0F) << 4);
    let x = ((x >> 8) & 0x00FF_00FF) | ((x & 0x00FF_00FF) << 8);
    x.rotate_left(16)
}

/// Incremental VRA CRC.
#[derive(Clone)]
pub struct VraCrc {
    hasher: Hasher,
    len: u64,
}

impl Default for VraCrc {
    fn default() -> Self {
        Self::new()
    }
}

impl VraCrc {
    pub fn new() -> Self {
        Self { hasher: Hasher::new_with_initial(0xFFFF_FFFF), len: 0 }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.len += data.len() as u64;
    }

    /// Bytes fed so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Final CRC value as stored in the header.
    pub fn finish(self) -> u32 {
        reverse_bits_32(!self.hasher.finalize())
    }
}

/// CRC over an in-memory file image, up to `end` bytes.
pub fn crc_of_bytes(file: &[u8], end: usize) -> u32 {
    let mut crc = VraCrc::new();
    let end = end.min(file.len());
    crc.update(&file[..VRA_CRC_OFFSET.min(end)]);
    if end > VRA_HEADER_LEN {
        for chunk in file[VRA_HEADER_LEN..end].chunks(CRC_CHUNK_SIZE) {
            crc.update(chunk);
        }
    }
    crc.finish()
}

/// CRC over a seekable file, up to `end` bytes. Returns the CRC and the
/// number of bytes covered.
pub fn crc_of_reader<R: Read + Seek>(reader: &mut R, end: u64) -> io::Result<(u32, u64)> {
    let mut crc = VraCrc::new();
    let mut buf = vec![0u8; CRC_CHUNK_SIZE];

    reader.seek(SeekFrom::Start(0))?;
    let head = (VRA_CRC_OFFSET as u64).min(end) as usize;
    reader.read_exact(&mut buf[..head])?;
    crc.update(&buf[..head]);

    let mut pos = VRA_HEADER_LEN as u64;
    if end > pos {
        reader.seek(SeekFrom::Start(pos))?;
    }
    while pos < end {
        let n = ((end - pos) as usize).min(CRC_CHUNK_SIZE);
        reader.read_exact(&mut buf[..n])?;
        crc.update(&buf[..n]);
        pos += n as u64;
    }
    let covered = crc.len();
    Ok((crc.finish(), covered))
}
