//! context/offsets.rs
//!
//! Population-count offset computation for the CIF0 fields.
//!
//! Design notes:
//! - Offsets are relative to the start of the context payload (CIF0 at 0).
//! - `precedes = !(f ^ (f - 1))`: `f ^ (f - 1)` sets every bit at and below
//!   the target's single bit, the inversion leaves the bits of fields that
//!   come before it on the wire (higher bits go first).
//! - Fixed widths are summed with three popcounts. The two 52-byte
//!   ephemeris fields sit in both the 8-byte and the 44-byte mask, so
//!   they are counted as 8 + 44 without a fourth mask.
//! - The GPS ASCII block (bit 9) and the association lists (bit 8) are the
//!   lowest field bits, so when either precedes the target every fixed field
//!   that is present precedes it too. Their own offsets are therefore the
//!   running sum so far, and their lengths are read from their first words.
//!   A length that runs past the payload is `Truncated`, never an offset.
//! - The CIF1/CIF2 words are least often present; they are folded in last
//!   with one more popcount.
//! - Sign step as in `header::offsets`: present → +offset, absent → the
//!   negated insertion point. Field offsets are never 0 (CIF0 sits there).

use byteorder::{BigEndian, ByteOrder};

use crate::context::fields::{
    ContextField, ASSOCIATION_BIT, CIF_WORDS, CTX_4, CTX_44, CTX_8, FIELD_BITS, GPS_ASCII_BIT,
};
use crate::packet::PacketError;

#[inline]
fn read_word(payload: &[u8], at: usize) -> Result<u32, PacketError> {
    payload
        .get(at..at + 4)
        .map(BigEndian::read_u32)
        .ok_or(PacketError::Truncated { needed: at + 4, available: payload.len() })
}

/// Reads CIF0 from the start of a context payload.
#[inline]
pub fn read_cif0(payload: &[u8]) -> Result<u32, PacketError> {
    read_word(payload, 0)
}

/// Byte length of the GPS ASCII block starting at `at`: OUI word, word
/// count `N`, then `N` words of text. Fails with `Truncated` when the block
/// runs past the payload.
pub fn gps_ascii_len(payload: &[u8], at: usize) -> Result<usize, PacketError> {
    let words = read_word(payload, at + 4)? as usize;
    bounded(payload, at, words.checked_mul(4).and_then(|n| n.checked_add(8)))
}

/// `len` when the section `at..at + len` lies inside the payload.
#[inline]
fn bounded(payload: &[u8], at: usize, len: Option<usize>) -> Result<usize, PacketError> {
    match len.and_then(|n| at.checked_add(n).map(|end| (n, end))) {
        Some((n, end)) if end <= payload.len() => Ok(n),
        _ => Err(PacketError::Truncated {
            needed: len.map_or(usize::MAX, |n| at.saturating_add(n)),
            available: payload.len(),
        }),
    }
}

/// Byte length of the association lists starting at `at`.
///
/// ```text
/// word 0: [rsvd:7][source:9][rsvd:7][system:9]
/// word 1: [vector:16][tag:1][async:15]
/// ```
///
/// Async entries carry one tag word each when the tag bit is set.
pub fn association_lists_len(payload: &[u8], at: usize) -> Result<usize, PacketError> {
    let w0 = read_word(payload, at)?;
    let w1 = read_word(payload, at + 4)?;
    let source = ((w0 >> 16) & 0x1FF) as usize;
    let system = (w0 & 0x1FF) as usize;
    let vector = ((w1 >> 16) & 0xFFFF) as usize;
    let tag = ((w1 >> 15) & 0x1) as usize;
    let asynchronous = (w1 & 0x7FFF) as usize;
    bounded(payload, at, Some(8 + 4 * (source + system + vector + asynchronous * (1 + tag))))
}

/// Offset of `field` within a context payload.
///
/// Positive: present at that offset. Negative: absent, would be inserted at
/// `-offset`. `ContextField::Cif0` is always 0 and `ContextEnd` is always
/// positive (end of the field area).
pub fn context_offset(payload: &[u8], field: ContextField) -> Result<i32, PacketError> {
    let f = field as u32;
    if f == 0 {
        return Ok(0);
    }
    let cif0 = read_cif0(payload)?;

    // CIF1 at 4; CIF2 at 4, or 8 behind a CIF1 word.
    if f & CIF_WORDS != 0 {
        let off = 4 + ((cif0 & f.wrapping_sub(1) & CIF_WORDS).count_ones() << 2) as i32;
        return Ok(signed(off, cif0 & f));
    }

    let precedes = !(f ^ f.wrapping_sub(1));
    let m = cif0 & FIELD_BITS & precedes;

    let mut off = (4
        + 4 * (m & CTX_4).count_ones()
        + 8 * (m & CTX_8).count_ones()
        + 44 * (m & CTX_44).count_ones()
        + 4 * (cif0 & CIF_WORDS).count_ones()) as usize;

    // Variable sections end inside the payload.
    if m & GPS_ASCII_BIT != 0 {
        off += gps_ascii_len(payload, off)?;
    }
    if m & ASSOCIATION_BIT != 0 {
        off += association_lists_len(payload, off)?;
    }
    let off = i32::try_from(off)
        .map_err(|_| PacketError::Truncated { needed: off, available: payload.len() })?;

    // Bit 0 stands in for the end marker and is forced on.
    Ok(signed(off, ((cif0 & FIELD_BITS) | 1) & f))
}

/// `off` when `own != 0`, else `-off`, without a branch.
#[inline(always)]
fn signed(off: i32, own: u32) -> i32 {
    let present = ((own | own.wrapping_neg()) >> 31) as i32;
    off * ((present << 1) - 1)
}

/// Byte length of a present field starting at `at` (variable fields read
/// their own length words).
pub fn context_field_len(payload: &[u8], field: ContextField, at: usize) -> Result<usize, PacketError> {
    match field {
        ContextField::GpsAscii => gps_ascii_len(payload, at),
        ContextField::ContextAssociationLists => association_lists_len(payload, at),
        ContextField::Cif0 => Ok(4),
        ContextField::ContextEnd => Ok(0),
        other => Ok(other.fixed_width().unwrap_or(0)),
    }
}

/// Offset just past the last CIF0 field.
pub fn context_end(payload: &[u8]) -> Result<usize, PacketError> {
    Ok(context_offset(payload, ContextField::ContextEnd)? as usize)
}
