//! buffer/store.rs
//! Segmented byte store: one logical packet over up to three regions.
//!
//! Design notes:
//! - The header region always exists and starts with the 4-byte prologue.
//! - Without a dedicated payload region the payload lives in the header
//!   region right after the header. Without a dedicated trailer region the
//!   trailer follows the payload in whichever region holds the payload.
//! - All lengths are derived from the prologue on every call; nothing is
//!   cached across a mutation.

use std::ops::Range;

use crate::buffer::region::Region;
use crate::constants::{MAX_PACKET_LEN, MIN_HEADER_LEN, TRAILER_LEN};
use crate::header::{control_word, header_length, PacketType};
use crate::packet::{InvalidReason, PacketError};

/// Identifies one of the three regions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Header,
    Payload,
    Trailer,
}

#[derive(Debug)]
pub struct SegmentedStore<'a> {
    header: Region<'a>,
    payload: Option<Region<'a>>,
    trailer: Option<Region<'a>>,
    read_only: bool,
}

impl<'a> SegmentedStore<'a> {
    /// Store over a single contiguous region.
    pub fn single(region: Region<'a>) -> Self {
        let read_only = matches!(region, Region::Shared(_));
        Self { header: region, payload: None, trailer: None, read_only }
    }

    pub fn from_regions(
        header: Region<'a>,
        payload: Option<Region<'a>>,
        trailer: Option<Region<'a>>,
    ) -> Self {
        let read_only = matches!(header, Region::Shared(_))
            || matches!(payload, Some(Region::Shared(_)))
            || matches!(trailer, Some(Region::Shared(_)));
        Self { header, payload, trailer, read_only }
    }

    // --- capability ---

    pub fn set_read_only(&mut self, read_only: bool) {
        // Shared regions stay read-only no matter what the caller asks.
        let shared = matches!(self.header, Region::Shared(_))
            || matches!(self.payload, Some(Region::Shared(_)))
            || matches!(self.trailer, Some(Region::Shared(_)));
        self.read_only = read_only || shared;
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    pub fn ensure_writable(&self) -> Result<(), PacketError> {
        if self.read_only {
            return Err(PacketError::ReadOnly);
        }
        Ok(())
    }

    /// True when any region aliases caller memory.
    pub fn is_direct(&self) -> bool {
        self.header.is_direct()
            || self.payload.as_ref().is_some_and(Region::is_direct)
            || self.trailer.as_ref().is_some_and(Region::is_direct)
    }

    // --- derived layout ---

    #[inline]
    pub fn control(&self) -> u16 {
        control_word(self.header.as_slice())
    }

    #[inline]
    pub fn packet_type(&self) -> PacketType {
        PacketType::from_byte0(self.header.as_slice()[0])
    }

    #[inline]
    pub fn header_len(&self) -> usize {
        header_length(self.control())
    }

    #[inline]
    pub fn trailer_len(&self) -> usize {
        let b0 = self.header.as_slice()[0];
        if PacketType::from_byte0(b0).is_data() && (b0 & 0x04) != 0 {
            TRAILER_LEN
        } else {
            0
        }
    }

    /// Declared packet length in bytes.
    #[inline]
    pub fn packet_len(&self) -> usize {
        let h = self.header.as_slice();
        u16::from_be_bytes([h[2], h[3]]) as usize * 4
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.packet_len()
            .saturating_sub(self.header_len())
            .saturating_sub(self.trailer_len())
    }

    /// Region and start offset of the payload.
    pub fn payload_location(&self) -> (Slot, usize) {
        match self.payload {
            Some(_) => (Slot::Payload, 0),
            None => (Slot::Header, self.header_len()),
        }
    }

    /// Region and start offset of the trailer.
    pub fn trailer_location(&self) -> (Slot, usize) {
        match self.trailer {
            Some(_) => (Slot::Trailer, 0),
            None => {
                let (slot, start) = self.payload_location();
                (slot, start + self.payload_len())
            }
        }
    }

    pub fn region(&self, slot: Slot) -> &Region<'a> {
        match slot {
            Slot::Header => &self.header,
            Slot::Payload => self.payload.as_ref().unwrap_or(&self.header),
            Slot::Trailer => self.trailer.as_ref().unwrap_or(&self.header),
        }
    }

    pub fn region_mut(&mut self, slot: Slot) -> &mut Region<'a> {
        match slot {
            Slot::Header => &mut self.header,
            Slot::Payload => self.payload.as_mut().unwrap_or(&mut self.header),
            Slot::Trailer => self.trailer.as_mut().unwrap_or(&mut self.header),
        }
    }

    /// Number of logical packet bytes held by `slot`.
    pub fn used_len(&self, slot: Slot) -> usize {
        let (p_slot, p_start) = self.payload_location();
        let (t_slot, t_start) = self.trailer_location();
        let t_len = self.trailer_len();
        let mut used = match slot {
            Slot::Header => self.header_len(),
            _ => 0,
        };
        if p_slot == slot {
            used = p_start + self.payload_len();
        }
        if t_slot == slot && t_len > 0 {
            used = t_start + t_len;
        }
        used
    }

    fn range_in(&self, slot: Slot, range: Range<usize>) -> &[u8] {
        self.region(slot).as_slice().get(range).unwrap_or(&[])
    }

    // --- slices ---

    pub fn header_bytes(&self) -> &[u8] {
        self.range_in(Slot::Header, 0..self.header_len())
    }

    pub(crate) fn header_mut(&mut self) -> Result<&mut [u8], PacketError> {
        self.ensure_writable()?;
        let len = self.header_len();
        let buf = self.header.as_mut_slice()?;
        let cap = buf.len();
        buf.get_mut(..len).ok_or(PacketError::Truncated { needed: len, available: cap })
    }

    pub fn payload(&self) -> &[u8] {
        let (slot, start) = self.payload_location();
        self.range_in(slot, start..start + self.payload_len())
    }

    pub(crate) fn payload_mut(&mut self) -> Result<&mut [u8], PacketError> {
        self.ensure_writable()?;
        let (slot, start) = self.payload_location();
        let end = start + self.payload_len();
        let buf = self.region_mut(slot).as_mut_slice()?;
        let cap = buf.len();
        buf.get_mut(start..end).ok_or(PacketError::Truncated { needed: end, available: cap })
    }

    pub fn trailer(&self) -> &[u8] {
        let (slot, start) = self.trailer_location();
        self.range_in(slot, start..start + self.trailer_len())
    }

    pub(crate) fn trailer_mut(&mut self) -> Result<&mut [u8], PacketError> {
        self.ensure_writable()?;
        let (slot, start) = self.trailer_location();
        let end = start + self.trailer_len();
        let buf = self.region_mut(slot).as_mut_slice()?;
        let cap = buf.len();
        buf.get_mut(start..end).ok_or(PacketError::Truncated { needed: end, available: cap })
    }

    /// Rewrites the length field. `bytes` must be a multiple of 4.
    pub(crate) fn set_packet_len(&mut self, bytes: usize) -> Result<(), PacketError> {
        assert!(bytes % 4 == 0, "packet length {bytes} is not a multiple of 4");
        if bytes > MAX_PACKET_LEN {
            return Err(PacketError::PacketTooLong { bytes });
        }
        self.ensure_writable()?;
        let words = (bytes / 4) as u16;
        let h = self.header.as_mut_slice()?;
        h[2..4].copy_from_slice(&words.to_be_bytes());
        Ok(())
    }

    /// Contiguous copy of the logical packet.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.packet_len());
        out.extend_from_slice(self.header_bytes());
        out.extend_from_slice(self.payload());
        out.extend_from_slice(self.trailer());
        out
    }

    /// Owned, contiguous copy of this store (keeps the read-only flag).
    pub fn to_owned_store(&self) -> SegmentedStore<'static> {
        let mut store = SegmentedStore::single(Region::Owned(self.to_vec()));
        store.read_only = self.read_only;
        store
    }

    /// Checks that the declared length fits the backing regions.
    pub fn check_capacity(&self) -> Result<(), InvalidReason> {
        let available = self.header.capacity();
        if available < MIN_HEADER_LEN {
            return Err(InvalidReason::BufferTooShort { declared: MIN_HEADER_LEN, available });
        }
        for slot in [Slot::Header, Slot::Payload, Slot::Trailer] {
            let owns = match slot {
                Slot::Header => true,
                Slot::Payload => self.payload.is_some(),
                Slot::Trailer => self.trailer.is_some(),
            };
            if !owns {
                continue;
            }
            let used = self.used_len(slot);
            let available = self.region(slot).capacity();
            if used > available {
                return Err(InvalidReason::BufferTooShort { declared: self.packet_len(), available });
            }
        }
        Ok(())
    }
}

impl Clone for SegmentedStore<'_> {
    fn clone(&self) -> Self {
        // Clones never alias the source buffers.
        let mut store = SegmentedStore::single(Region::Owned(self.to_vec()));
        store.read_only = self.read_only;
        store
    }
}
