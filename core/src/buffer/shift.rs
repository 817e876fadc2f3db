//! buffer/shift.rs
//! Inserts or removes the byte span of an optional field and relocates
//! everything behind it.
//!
//! Design notes:
//! - Every shift rewrites the packet length field, so afterwards
//!   `packet_len == header + payload + trailer` holds again once the caller
//!   has updated the control bits that describe the new layout.
//! - `shift_header` reads the field offset *before* touching anything; the
//!   caller flips the presence bits afterwards.
//! - Inserts reserve room before moving bytes, removes release after.
//! - A byte count that is not a multiple of 4 is a caller bug and panics.
//! - No rollback: if a shift fails half-way the packet must be discarded.

use tracing::debug;

use crate::buffer::region::Region;
use crate::buffer::store::{SegmentedStore, Slot};
use crate::constants::{MAX_HEADER_LEN, MAX_PACKET_LEN, PAYLOAD_GROWTH_STEP, TRAILER_LEN};
use crate::header::{header_offset, HeaderField};
use crate::packet::PacketError;

/// Growth step for the region in `slot`: payload-bearing regions grow in
/// 4 KiB blocks, a header-only region just to the largest header.
fn growth_step(store: &SegmentedStore<'_>, slot: Slot) -> usize {
    let (p_slot, _) = store.payload_location();
    match slot {
        _ if p_slot == slot => PAYLOAD_GROWTH_STEP,
        Slot::Trailer => TRAILER_LEN,
        _ => MAX_HEADER_LEN,
    }
}

fn resized_total(store: &SegmentedStore<'_>, delta: isize) -> Result<usize, PacketError> {
    let total = store.packet_len() as isize + delta;
    if total < 0 {
        return Err(PacketError::Truncated { needed: delta.unsigned_abs(), available: store.packet_len() });
    }
    let total = total as usize;
    if total > MAX_PACKET_LEN {
        return Err(PacketError::PacketTooLong { bytes: total });
    }
    Ok(total)
}

/// Opens a zeroed gap of `n` bytes at `pos` in `slot`, moving `pos..used`.
fn open_gap(store: &mut SegmentedStore<'_>, slot: Slot, pos: usize, n: usize) -> Result<(), PacketError> {
    let used = store.used_len(slot);
    let step = growth_step(store, slot);
    let region: &mut Region<'_> = store.region_mut(slot);
    region.reserve(used + n, step)?;
    let buf = region.as_mut_slice()?;
    buf.copy_within(pos..used, pos + n);
    buf[pos..pos + n].fill(0);
    Ok(())
}

/// Closes the `n` bytes at `pos` in `slot`, moving `pos + n..used` down.
fn close_gap(store: &mut SegmentedStore<'_>, slot: Slot, pos: usize, n: usize) -> Result<(), PacketError> {
    let used = store.used_len(slot);
    if pos + n > used {
        return Err(PacketError::Truncated { needed: pos + n, available: used });
    }
    let step = growth_step(store, slot);
    let region = store.region_mut(slot);
    {
        let buf = region.as_mut_slice()?;
        buf.copy_within(pos + n..used, pos);
        buf[used - n..used].fill(0);
    }
    region.release(used - n, step);
    Ok(())
}

/// Adds (`want_present`) or drops `byte_count` bytes for a header field.
///
/// No-op when the field's presence already matches. Returns `true` when
/// bytes were moved so the caller knows to flip the control bits.
pub fn shift_header(
    store: &mut SegmentedStore<'_>,
    field: HeaderField,
    byte_count: usize,
    want_present: bool,
) -> Result<bool, PacketError> {
    assert!(byte_count % 4 == 0, "header shift of {byte_count} bytes is not word aligned");
    let off = header_offset(store.control(), field);
    if (off > 0) == want_present || byte_count == 0 {
        return Ok(false);
    }
    store.ensure_writable()?;

    let pos = off.unsigned_abs() as usize;
    let delta = if want_present { byte_count as isize } else { -(byte_count as isize) };
    let total = resized_total(store, delta)?;

    if want_present {
        open_gap(store, Slot::Header, pos, byte_count)?;
    } else {
        close_gap(store, Slot::Header, pos, byte_count)?;
    }
    store.set_packet_len(total)?;
    debug!(?field, pos, byte_count, want_present, total, "header shift");
    Ok(true)
}

/// Inserts or removes `byte_count` bytes at `offset` (relative to the
/// payload start).
pub fn shift_payload(
    store: &mut SegmentedStore<'_>,
    offset: usize,
    byte_count: usize,
    insert: bool,
) -> Result<(), PacketError> {
    assert!(byte_count % 4 == 0, "payload shift of {byte_count} bytes is not word aligned");
    if byte_count == 0 {
        return Ok(());
    }
    store.ensure_writable()?;
    if offset > store.payload_len() || (!insert && offset + byte_count > store.payload_len()) {
        return Err(PacketError::Truncated {
            needed: offset + if insert { 0 } else { byte_count },
            available: store.payload_len(),
        });
    }

    let delta = if insert { byte_count as isize } else { -(byte_count as isize) };
    let total = resized_total(store, delta)?;
    let (slot, start) = store.payload_location();

    if insert {
        open_gap(store, slot, start + offset, byte_count)?;
    } else {
        close_gap(store, slot, start + offset, byte_count)?;
    }
    store.set_packet_len(total)?;
    debug!(offset, byte_count, insert, total, "payload shift");
    Ok(())
}

/// Adds (`+4`) or removes (`-4`) the trailer and flips the trailer bit.
///
/// The trailer is all-or-nothing; `0` is a no-op. Only data packets carry
/// a trailer.
pub fn shift_trailer(store: &mut SegmentedStore<'_>, byte_count: i32) -> Result<(), PacketError> {
    assert!(
        byte_count == 0 || byte_count.unsigned_abs() as usize == TRAILER_LEN,
        "trailer shift of {byte_count} bytes; the trailer is 0 or {TRAILER_LEN} bytes"
    );
    let want_present = byte_count > 0;
    let present = store.trailer_len() > 0;
    if byte_count == 0 || present == want_present {
        return Ok(());
    }
    if !store.packet_type().is_data() {
        return Err(PacketError::WrongPacketKind { expected: "data", found: store.packet_type() });
    }
    store.ensure_writable()?;

    let total = resized_total(store, byte_count as isize)?;
    let (slot, pos) = store.trailer_location();

    if want_present {
        open_gap(store, slot, pos, TRAILER_LEN)?;
        store.header_mut()?[0] |= 0x04;
    } else {
        close_gap(store, slot, pos, TRAILER_LEN)?;
        store.header_mut()?[0] &= !0x04;
    }
    store.set_packet_len(total)?;
    debug!(want_present, total, "trailer shift");
    Ok(())
}
