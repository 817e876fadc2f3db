//! packet/validate.rs
//! Structural validity checks, independent of which fields are populated.
//!
//! Checks run in priority order and the first failure wins:
//! 1. type-appropriate reserved bits in byte 0 (reserved types 6..15 fail)
//! 2. class-id reserved bits, when a class id is present
//! 3. packet length >= header length + trailer length
//! 4. packet length == caller's expected length, when given
//! 5. declared length fits the backing buffer(s)
//!
//! `CheckMode::Lenient` skips 1 and 2.

use crate::buffer::SegmentedStore;
use crate::constants::{MIN_HEADER_LEN, TRAILER_LEN};
use crate::header::{control_word, header_length, header_offset, HeaderField, PacketType, Vita49Version};
use crate::packet::types::{CheckMode, InvalidReason, Packet};

/// Reserved bits of header byte 0 for the packet kind and sub-version.
pub const fn reserved_byte0_mask(is_data: bool, version: Vita49Version) -> u8 {
    match (version, is_data) {
        (Vita49Version::V49_0, true) => 0x03,
        (Vita49Version::V49_0, false) => 0x06,
        (Vita49Version::V49_2, true) => 0x00,
        (Vita49Version::V49_2, false) => 0x04,
    }
}

/// Reserved bits of the class-id byte 0 (pad count + reserved).
pub const fn reserved_class_id_mask(is_data: bool, version: Vita49Version) -> u8 {
    match (version, is_data) {
        (Vita49Version::V49_0, _) => 0xFF,
        (Vita49Version::V49_2, true) => 0x07,
        (Vita49Version::V49_2, false) => 0xFF,
    }
}

fn check_reserved(header: &[u8], version: Vita49Version) -> Result<(), InvalidReason> {
    let b0 = header[0];
    let ptype = PacketType::from_byte0(b0);
    if ptype.is_reserved() {
        return Err(InvalidReason::ReservedBits);
    }
    let is_data = ptype.is_data();
    if b0 & reserved_byte0_mask(is_data, version) != 0 {
        return Err(InvalidReason::ReservedBits);
    }

    let cid = header_offset(control_word(header), HeaderField::ClassId);
    if cid > 0 {
        let at = cid as usize;
        let Some(&pad) = header.get(at) else {
            return Err(InvalidReason::BufferTooShort { declared: at + 1, available: header.len() });
        };
        if pad & reserved_class_id_mask(is_data, version) != 0 {
            return Err(InvalidReason::ClassIdReservedBits);
        }
    }
    Ok(())
}

fn minimum_len(header: &[u8]) -> usize {
    let b0 = header[0];
    let trailer = if PacketType::from_byte0(b0).is_data() && b0 & 0x04 != 0 { TRAILER_LEN } else { 0 };
    header_length(control_word(header)) + trailer
}

fn check_lengths(declared: usize, minimum: usize, expected: Option<usize>) -> Result<(), InvalidReason> {
    if declared < minimum {
        return Err(InvalidReason::Length { declared, minimum });
    }
    if let Some(expected) = expected {
        if expected != declared {
            return Err(InvalidReason::ExpectedLength { expected, actual: declared });
        }
    }
    Ok(())
}

/// Checks raw packet bytes.
///
/// `prefix` holds at least the packet header; `available` is how many bytes
/// the container actually holds for this packet (may exceed `prefix.len()`
/// when only the header was read).
pub fn check_packet(
    prefix: &[u8],
    available: usize,
    mode: CheckMode,
    version: Vita49Version,
    expected: Option<usize>,
) -> Result<(), InvalidReason> {
    if prefix.len() < MIN_HEADER_LEN {
        return Err(InvalidReason::BufferTooShort { declared: MIN_HEADER_LEN, available: prefix.len() });
    }
    if mode == CheckMode::Strict {
        check_reserved(prefix, version)?;
    }
    let declared = u16::from_be_bytes([prefix[2], prefix[3]]) as usize * 4;
    check_lengths(declared, minimum_len(prefix), expected)?;
    if declared > available {
        return Err(InvalidReason::BufferTooShort { declared, available });
    }
    Ok(())
}

/// Checks a packet held in a segmented store.
pub(crate) fn check_store(
    store: &SegmentedStore<'_>,
    mode: CheckMode,
    version: Vita49Version,
    expected: Option<usize>,
) -> Result<(), InvalidReason> {
    let header = store.region(crate::buffer::Slot::Header).as_slice();
    if mode == CheckMode::Strict {
        check_reserved(header, version)?;
    }
    check_lengths(store.packet_len(), minimum_len(header), expected)?;
    store.check_capacity()
}

impl Packet<'_> {
    /// Runs the structural checks against this packet.
    pub fn check(&self, mode: CheckMode, expected: Option<usize>) -> Result<(), InvalidReason> {
        check_store(&self.store, mode, self.version, expected)
    }

    /// Strict check, no expected length.
    pub fn is_valid(&self) -> bool {
        self.check(CheckMode::Strict, None).is_ok()
    }
}
