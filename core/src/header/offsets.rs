//! header/offsets.rs
//!
//! Branch-free offset computation for the optional header fields.
//!
//! Design notes:
//! - The two control bytes are collapsed into a 5-bit presence vector
//!   `p` with fixed shifts and ORs:
//!
//!   ```text
//!   bit 0  stream id        byte0 bit 4 | byte0 bit 6   (type nibble & 0b0101)
//!   bit 1  class id         byte0 bit 3
//!   bit 2  integer time     byte1 bit 7 | byte1 bit 6   (TSI != 0)
//!   bit 3  fractional time  byte1 bit 5 | byte1 bit 4   (TSF != 0)
//!   bit 4  payload          forced on
//!   ```
//!
//! - A `HeaderField` discriminant is a 32-bit mask: the low byte holds the
//!   field's own bit in `p`, the second byte holds the bits of every field
//!   that precedes it on the wire.
//! - Widths are 4, 8, 4, 8 bytes for bits 0..3. With `q = p & precedes`,
//!   `(q & 0b0011) << 2` yields 4·[sid] + 8·[cid] and `q & 0b1100` yields
//!   4·[tsi] + 8·[tsf], so the sum needs no per-field multiply.
//! - Sign step: `present` is 0 or 1, `2·present - 1` is -1 or +1. An absent
//!   field returns the negated insertion point. Offsets are never 0 here
//!   (the prologue occupies bytes 0..4), so the sign is unambiguous.

/// Optional header fields plus the payload start.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeaderField {
    StreamId = 0x0001,
    ClassId = 0x0102,
    IntegerTime = 0x0304,
    FractionalTime = 0x0708,
    Payload = 0x0F10,
}

impl HeaderField {
    pub const ALL: [HeaderField; 5] = [
        HeaderField::StreamId,
        HeaderField::ClassId,
        HeaderField::IntegerTime,
        HeaderField::FractionalTime,
        HeaderField::Payload,
    ];

    /// Byte width of the field on the wire (0 for the payload marker).
    pub const fn width(self) -> usize {
        match self {
            HeaderField::StreamId => 4,
            HeaderField::ClassId => 8,
            HeaderField::IntegerTime => 4,
            HeaderField::FractionalTime => 8,
            HeaderField::Payload => 0,
        }
    }
}

const PAYLOAD_BIT: u32 = 0x10;

/// Collapses the control word (`byte0 << 8 | byte1`) into the presence vector.
#[inline(always)]
pub const fn presence_vector(control: u16) -> u32 {
    let c = control as u32;
    (((c >> 12) | (c >> 14)) & 0x1)
        | ((c >> 10) & 0x2)
        | (((c >> 5) | (c >> 4)) & 0x4)
        | (((c >> 2) | (c >> 1)) & 0x8)
        | PAYLOAD_BIT
}

/// Offset of `field` for the given control word.
///
/// Positive: the field is present at that byte offset. Negative: the field
/// is absent and would be inserted at `-offset`.
#[inline(always)]
pub const fn header_offset(control: u16, field: HeaderField) -> i32 {
    let mask = field as u32;
    let p = presence_vector(control);

    let q = p & (mask >> 8) & 0xF;
    let off = 4 + (((q & 0x3) << 2) + (q & 0xC)) as i32;

    let own = p & mask & 0xFF;
    let present = ((own | own.wrapping_neg()) >> 31) as i32;
    off * ((present << 1) - 1)
}

/// Header length in bytes (offset of the payload).
#[inline(always)]
pub const fn header_length(control: u16) -> usize {
    header_offset(control, HeaderField::Payload) as usize
}

/// Reads the control word from the first two header bytes.
#[inline(always)]
pub fn control_word(header: &[u8]) -> u16 {
    u16::from_be_bytes([header[0], header[1]])
}
