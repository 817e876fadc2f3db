//! container/iter.rs
//! Cursor protocol for walking packets inside any container.
//!
//! Design notes:
//! - A container exposes three operations: "is there a packet at this
//!   offset", "read (or just skip) the packet at this offset" and,
//!   optionally, "remove the packet at this offset".
//! - `PacketIterator` owns one `BytesMut` scratch buffer that grows on
//!   demand and is reused for every packet.
//! - `next_view` lends a read-only packet over the scratch buffer; the
//!   `Iterator` impl hands out owned copies instead.
//! - A packet whose declared length cannot be right (shorter than its own
//!   header, or running past the container end) stops the walk with
//!   `VrtError::Corrupt`.

use bytes::BytesMut;
use tracing::{trace, warn};

use crate::constants::MIN_HEADER_LEN;
use crate::header::{control_word, header_length, Vita49Version};
use crate::packet::{check_packet, CheckMode, Packet};
use crate::telemetry::ScanCounters;
use crate::types::VrtError;

/// How much of a packet `read_packet_at` copies into the scratch buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadMode {
    /// The whole packet.
    Full,
    /// The header only; used to step over packets without copying payloads.
    HeaderOnly,
}

pub trait PacketContainer {
    /// Offset of the first packet.
    fn first_offset(&self) -> u64;

    /// True when a packet starts at `offset`.
    fn has_next_at(&mut self, offset: u64) -> Result<bool, VrtError>;

    /// Copies the packet at `offset` into `scratch` (cleared first) and
    /// returns its length in bytes; the next packet starts right after.
    fn read_packet_at(&mut self, offset: u64, scratch: &mut BytesMut, mode: ReadMode) -> Result<u64, VrtError>;

    /// Deletes the packet at `offset`, closing the gap.
    fn remove_packet_at(&mut self, offset: u64) -> Result<(), VrtError> {
        let _ = offset;
        Err(VrtError::Unsupported("container does not support packet removal"))
    }

    /// Sub-version attached to packets read from this container.
    fn version(&self) -> Vita49Version {
        Vita49Version::default()
    }
}

/// Validates the prologue found at `offset` and returns the packet length
/// and header length. `remaining` is the number of container bytes from
/// `offset` to the container end.
pub fn frame_at(prologue: &[u8], offset: u64, remaining: u64) -> Result<(usize, usize), VrtError> {
    let available = usize::try_from(remaining).unwrap_or(usize::MAX);
    if let Err(reason) = check_packet(prologue, available, CheckMode::Lenient, Vita49Version::default(), None) {
        warn!(offset, %reason, "corrupt packet framing");
        return Err(VrtError::Corrupt { offset, reason });
    }
    let declared = u16::from_be_bytes([prologue[2], prologue[3]]) as usize * 4;
    Ok((declared, header_length(control_word(prologue))))
}

pub struct PacketIterator<'c, C: PacketContainer + ?Sized> {
    container: &'c mut C,
    offset: u64,
    previous: Option<u64>,
    scratch: BytesMut,
    counters: ScanCounters,
    failed: bool,
}

impl<'c, C: PacketContainer + ?Sized> PacketIterator<'c, C> {
    pub fn new(container: &'c mut C) -> Self {
        let offset = container.first_offset();
        Self {
            container,
            offset,
            previous: None,
            scratch: BytesMut::with_capacity(MIN_HEADER_LEN),
            counters: ScanCounters::default(),
            failed: false,
        }
    }

    /// Offset of the next packet.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Offset of the most recently read or skipped packet.
    pub fn previous_offset(&self) -> Option<u64> {
        self.previous
    }

    pub fn counters(&self) -> &ScanCounters {
        &self.counters
    }

    pub fn into_counters(self) -> ScanCounters {
        self.counters
    }

    pub fn has_next(&mut self) -> Result<bool, VrtError> {
        if self.failed {
            return Ok(false);
        }
        self.container.has_next_at(self.offset)
    }

    fn advance(&mut self, mode: ReadMode) -> Result<Option<u64>, VrtError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let at = self.offset;
        let len = match self.container.read_packet_at(at, &mut self.scratch, mode) {
            Ok(len) => len,
            Err(e) => {
                self.failed = true;
                return Err(e);
            }
        };
        self.previous = Some(at);
        self.offset = at + len;
        match mode {
            ReadMode::Full => self.counters.add_read(len as usize),
            ReadMode::HeaderOnly => self.counters.add_skip(self.scratch.len()),
        }
        trace!(offset = at, len, ?mode, "packet");
        Ok(Some(at))
    }

    /// Reads the next packet and lends it as a read-only view over the
    /// scratch buffer.
    pub fn next_view(&mut self) -> Result<Option<Packet<'_>>, VrtError> {
        if self.advance(ReadMode::Full)?.is_none() {
            return Ok(None);
        }
        let version = self.container.version();
        Ok(Some(Packet::view(&self.scratch[..])?.with_version(version)))
    }

    /// Steps over the next packet, reading its header only. Returns the
    /// skipped packet's offset.
    pub fn skip_packet(&mut self) -> Result<Option<u64>, VrtError> {
        self.advance(ReadMode::HeaderOnly)
    }

    /// Header bytes (or the whole packet) of the most recent read.
    pub fn last_bytes(&self) -> &[u8] {
        &self.scratch
    }

    /// Removes the most recently read packet; the cursor stays on the
    /// packet that followed it. The container counts the removal.
    pub fn remove(&mut self) -> Result<(), VrtError> {
        let Some(at) = self.previous.take() else {
            return Err(VrtError::Unsupported("remove needs a packet read first"));
        };
        self.container.remove_packet_at(at)?;
        self.offset = at;
        Ok(())
    }
}

impl<C: PacketContainer + ?Sized> Iterator for PacketIterator<'_, C> {
    type Item = Result<Packet<'static>, VrtError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_view() {
            Ok(Some(view)) => Some(Ok(view.to_owned_packet())),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
