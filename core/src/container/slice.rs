//! container/slice.rs
//! Packets laid back to back in a byte slice (e.g. a received datagram
//! burst or a memory-mapped capture). Read-only: removal is refused.

use bytes::BytesMut;

use crate::constants::MIN_HEADER_LEN;
use crate::container::iter::{frame_at, PacketContainer, PacketIterator, ReadMode};
use crate::header::Vita49Version;
use crate::types::VrtError;

#[derive(Copy, Clone, Debug)]
pub struct PacketSlice<'a> {
    bytes: &'a [u8],
    version: Vita49Version,
}

impl<'a> PacketSlice<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, version: Vita49Version::default() }
    }

    pub fn with_version(mut self, version: Vita49Version) -> Self {
        self.version = version;
        self
    }

    pub fn packets(&mut self) -> PacketIterator<'_, Self> {
        PacketIterator::new(self)
    }
}

impl PacketContainer for PacketSlice<'_> {
    fn first_offset(&self) -> u64 {
        0
    }

    fn has_next_at(&mut self, offset: u64) -> Result<bool, VrtError> {
        Ok(offset as usize + MIN_HEADER_LEN <= self.bytes.len())
    }

    fn read_packet_at(&mut self, offset: u64, scratch: &mut BytesMut, mode: ReadMode) -> Result<u64, VrtError> {
        let at = offset as usize;
        let rest = self.bytes.get(at..).unwrap_or(&[]);
        let prologue = rest.get(..MIN_HEADER_LEN).unwrap_or(rest);
        let (len, header_len) = frame_at(prologue, offset, rest.len() as u64)?;
        let take = match mode {
            ReadMode::Full => len,
            ReadMode::HeaderOnly => header_len.min(len),
        };
        scratch.clear();
        scratch.extend_from_slice(&rest[..take]);
        Ok(len as u64)
    }

    fn version(&self) -> Vita49Version {
        self.version
    }
}
