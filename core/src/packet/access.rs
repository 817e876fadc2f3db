//! packet/access.rs
//! Header and payload accessors on `Packet`.
//!
//! Design notes:
//! - Getters compute offsets from the current control word on every call.
//! - Setters that change presence go through the shift engine first (which
//!   reads offsets under the *old* layout) and flip control bits after.
//! - The stream id is implied by the packet type, so it is added or
//!   dropped only by `set_packet_type`.

use byteorder::{BigEndian, ByteOrder};

use crate::buffer::{shift_header, shift_payload, shift_trailer};
use crate::constants::header_widths::{CLASS_ID, FRACTIONAL_TIME, INTEGER_TIME, STREAM_ID};
use crate::constants::TRAILER_LEN;
use crate::header::{
    header_offset, ClassId, FractionalMode, HeaderField, IntegerMode, PacketType, TimeSource, TimeStamp,
};
use crate::packet::types::{Packet, PacketError};

impl<'a> Packet<'a> {
    // --- layout ---

    #[inline]
    pub fn header_len(&self) -> usize {
        self.store.header_len()
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.store.payload_len()
    }

    #[inline]
    pub fn trailer_len(&self) -> usize {
        self.store.trailer_len()
    }

    /// Total length in bytes, from the length field.
    #[inline]
    pub fn packet_len(&self) -> usize {
        self.store.packet_len()
    }

    /// Offset of a header field: positive when present, negated insertion
    /// point when absent.
    #[inline]
    pub fn field_offset(&self, field: HeaderField) -> i32 {
        header_offset(self.store.control(), field)
    }

    fn present_at(&self, field: HeaderField) -> Option<usize> {
        let off = self.field_offset(field);
        (off > 0).then_some(off as usize)
    }

    fn header_byte(&self, i: usize) -> u8 {
        self.store.region(crate::buffer::Slot::Header).as_slice()[i]
    }

    fn update_byte(&mut self, i: usize, clear: u8, set: u8) -> Result<(), PacketError> {
        let h = self.store.header_mut()?;
        h[i] = (h[i] & !clear) | set;
        Ok(())
    }

    // --- prologue ---

    #[inline]
    pub fn packet_type(&self) -> PacketType {
        self.store.packet_type()
    }

    #[inline]
    pub fn is_data(&self) -> bool {
        self.packet_type().is_data()
    }

    #[inline]
    pub fn is_context(&self) -> bool {
        self.packet_type().is_context()
    }

    /// Changes the type nibble, adding or dropping the stream id and
    /// dropping the trailer when the packet stops being a data packet.
    pub fn set_packet_type(&mut self, packet_type: PacketType) -> Result<(), PacketError> {
        if packet_type.is_reserved() {
            return Err(PacketError::Unsupported("reserved packet type"));
        }
        self.store.ensure_writable()?;
        if !packet_type.is_data() {
            shift_trailer(&mut self.store, -(TRAILER_LEN as i32))?;
        }
        shift_header(&mut self.store, HeaderField::StreamId, STREAM_ID, packet_type.has_stream_id())?;

        // Byte 0 bit 2 is data-only, bit 0 context-only.
        let kind_bits = if packet_type.is_data() { 0x01 } else { 0x04 };
        let h = self.store.header_mut()?;
        h[0] = (u8::from(packet_type) << 4) | (h[0] & 0x0F & !kind_bits);
        Ok(())
    }

    /// Modulo-16 packet count.
    #[inline]
    pub fn packet_count(&self) -> u8 {
        self.header_byte(1) & 0x0F
    }

    pub fn set_packet_count(&mut self, count: u8) -> Result<(), PacketError> {
        self.update_byte(1, 0x0F, count & 0x0F)
    }

    /// Time-stamp mode bit (context packets only).
    pub fn tsm(&self) -> Option<bool> {
        self.is_context().then(|| self.header_byte(0) & 0x01 != 0)
    }

    pub fn set_tsm(&mut self, tsm: bool) -> Result<(), PacketError> {
        if !self.is_context() {
            return Err(PacketError::WrongPacketKind { expected: "context", found: self.packet_type() });
        }
        self.update_byte(0, 0x01, tsm as u8)
    }

    // --- stream id ---

    pub fn stream_id(&self) -> Option<u32> {
        let at = self.present_at(HeaderField::StreamId)?;
        Some(BigEndian::read_u32(&self.store.header_bytes()[at..at + STREAM_ID]))
    }

    pub fn set_stream_id(&mut self, stream_id: u32) -> Result<(), PacketError> {
        let Some(at) = self.present_at(HeaderField::StreamId) else {
            return Err(PacketError::Unsupported("packet type carries no stream id"));
        };
        BigEndian::write_u32(&mut self.store.header_mut()?[at..at + STREAM_ID], stream_id);
        Ok(())
    }

    /// Packet type nibble in the top 4 bits, stream id (or 0) in the low 32.
    pub fn stream_code(&self) -> u64 {
        let type_bits = (u64::from(self.header_byte(0)) & 0xF0) << 56;
        type_bits | u64::from(self.stream_id().unwrap_or(0))
    }

    // --- class id ---

    pub fn class_id(&self) -> Option<ClassId> {
        let at = self.present_at(HeaderField::ClassId)?;
        let bytes: &[u8; CLASS_ID] = self.store.header_bytes()[at..at + CLASS_ID].try_into().ok()?;
        Some(ClassId::from_bytes(bytes))
    }

    /// `None` removes the class id.
    pub fn set_class_id(&mut self, class_id: Option<ClassId>) -> Result<(), PacketError> {
        self.store.ensure_writable()?;
        shift_header(&mut self.store, HeaderField::ClassId, CLASS_ID, class_id.is_some())?;
        match class_id {
            Some(cid) => {
                self.update_byte(0, 0, 0x08)?;
                let at = self.field_offset(HeaderField::ClassId) as usize;
                self.store.header_mut()?[at..at + CLASS_ID].copy_from_slice(&cid.to_bytes());
            }
            None => self.update_byte(0, 0x08, 0)?,
        }
        Ok(())
    }

    // --- time stamps ---

    #[inline]
    pub fn integer_mode(&self) -> IntegerMode {
        IntegerMode::from((self.header_byte(1) >> 6) & 0x3)
    }

    #[inline]
    pub fn fractional_mode(&self) -> FractionalMode {
        FractionalMode::from((self.header_byte(1) >> 4) & 0x3)
    }

    pub fn integer_timestamp(&self) -> Option<u32> {
        let at = self.present_at(HeaderField::IntegerTime)?;
        Some(BigEndian::read_u32(&self.store.header_bytes()[at..at + INTEGER_TIME]))
    }

    pub fn fractional_timestamp(&self) -> Option<u64> {
        let at = self.present_at(HeaderField::FractionalTime)?;
        Some(BigEndian::read_u64(&self.store.header_bytes()[at..at + FRACTIONAL_TIME]))
    }

    pub fn time_stamp(&self) -> TimeStamp {
        TimeStamp {
            integer_mode: self.integer_mode(),
            fractional_mode: self.fractional_mode(),
            seconds: self.integer_timestamp().unwrap_or(0),
            fractional: self.fractional_timestamp().unwrap_or(0),
        }
    }

    /// Writes both time-stamp fields and their modes, adding or dropping
    /// each field to match its mode.
    pub fn set_time(&mut self, time: &impl TimeSource) -> Result<(), PacketError> {
        self.store.ensure_writable()?;
        let tsi = u8::from(time.integer_mode());
        let tsf = u8::from(time.fractional_mode());

        shift_header(&mut self.store, HeaderField::IntegerTime, INTEGER_TIME, tsi != 0)?;
        self.update_byte(1, 0xC0, tsi << 6)?;
        shift_header(&mut self.store, HeaderField::FractionalTime, FRACTIONAL_TIME, tsf != 0)?;
        self.update_byte(1, 0x30, tsf << 4)?;

        if let Some(at) = self.present_at(HeaderField::IntegerTime) {
            BigEndian::write_u32(&mut self.store.header_mut()?[at..at + INTEGER_TIME], time.seconds());
        }
        if let Some(at) = self.present_at(HeaderField::FractionalTime) {
            BigEndian::write_u64(&mut self.store.header_mut()?[at..at + FRACTIONAL_TIME], time.fractional());
        }
        Ok(())
    }

    // --- payload ---

    pub fn payload(&self) -> &[u8] {
        self.store.payload()
    }

    pub fn payload_mut(&mut self) -> Result<&mut [u8], PacketError> {
        self.store.payload_mut()
    }

    /// Grows or shrinks the payload at its end. New bytes are zero.
    pub fn set_payload_len(&mut self, len: usize) -> Result<(), PacketError> {
        if len % 4 != 0 {
            return Err(PacketError::InvalidValue(format!("payload length {len} is not a multiple of 4")));
        }
        let current = self.payload_len();
        if len > current {
            shift_payload(&mut self.store, current, len - current, true)
        } else {
            shift_payload(&mut self.store, len, current - len, false)
        }
    }

    /// Replaces the payload. `data.len()` must be a multiple of 4.
    pub fn set_payload(&mut self, data: &[u8]) -> Result<(), PacketError> {
        self.store.ensure_writable()?;
        self.set_payload_len(data.len())?;
        self.payload_mut()?.copy_from_slice(data);
        Ok(())
    }
}
