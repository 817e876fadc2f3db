//! context/access.rs
//! Raw and typed access to context packet fields.
//!
//! Design notes:
//! - Every call re-reads CIF0 and recomputes offsets; nothing is cached.
//! - Adding a field inserts its bytes at the insertion point first, then
//!   sets the CIF0 bit. Removing clears the bit after the bytes are gone.
//! - Typed setters take `Option`: `None` removes the field.
//! - CIF1/CIF2 words exist only in VITA-49.2 packets.

use byteorder::{BigEndian, ByteOrder};

use crate::buffer::shift_payload;
use crate::constants::radix;
use crate::context::fields::{Cif0, ContextField};
use crate::context::fixed::{from_fixed_i16, from_fixed_i64, to_fixed_i16, to_fixed_i64};
use crate::context::offsets::{context_field_len, context_offset, read_cif0};
use crate::header::Vita49Version;
use crate::packet::{Packet, PacketError};

/// Two-stage gain, dB. Stage 1 sits in the low half-word.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Gain {
    pub stage1: f64,
    pub stage2: f64,
}

/// Manufacturer OUI plus device code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceId {
    pub oui: u32,
    pub device_code: u16,
}

/// GPS ASCII sentence block: OUI, then NUL-padded text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GpsAscii {
    pub oui: u32,
    pub text: Vec<u8>,
}

impl GpsAscii {
    pub fn to_bytes(&self) -> Result<Vec<u8>, PacketError> {
        if self.oui > 0x00FF_FFFF {
            return Err(PacketError::InvalidValue(format!("OUI 0x{:x} exceeds 24 bits", self.oui)));
        }
        let words = self.text.len().div_ceil(4);
        let mut out = vec![0u8; 8 + 4 * words];
        BigEndian::write_u32(&mut out[0..4], self.oui);
        BigEndian::write_u32(&mut out[4..8], words as u32);
        out[8..8 + self.text.len()].copy_from_slice(&self.text);
        Ok(out)
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self, PacketError> {
        if b.len() < 8 {
            return Err(PacketError::Truncated { needed: 8, available: b.len() });
        }
        let words = BigEndian::read_u32(&b[4..8]) as usize;
        let end = 8 + 4 * words;
        let text = b.get(8..end).ok_or(PacketError::Truncated { needed: end, available: b.len() })?;
        let trimmed = text.len() - text.iter().rev().take_while(|&&c| c == 0).count();
        Ok(Self { oui: BigEndian::read_u32(&b[0..4]) & 0x00FF_FFFF, text: text[..trimmed].to_vec() })
    }
}

/// Context association lists. Asynchronous entries optionally carry one
/// tag word each.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssociationLists {
    pub source: Vec<u32>,
    pub system: Vec<u32>,
    pub vector: Vec<u32>,
    pub asynchronous: Vec<u32>,
    pub async_tags: Option<Vec<u32>>,
}

impl AssociationLists {
    pub fn to_bytes(&self) -> Result<Vec<u8>, PacketError> {
        if self.source.len() > 0x1FF || self.system.len() > 0x1FF {
            return Err(PacketError::InvalidValue("source/system list longer than 511".into()));
        }
        if self.vector.len() > 0xFFFF || self.asynchronous.len() > 0x7FFF {
            return Err(PacketError::InvalidValue("vector/async list too long".into()));
        }
        if let Some(tags) = &self.async_tags {
            if tags.len() != self.asynchronous.len() {
                return Err(PacketError::InvalidValue("async tag count differs from async list".into()));
            }
        }
        let w0 = ((self.source.len() as u32) << 16) | self.system.len() as u32;
        let w1 = ((self.vector.len() as u32) << 16)
            | (u32::from(self.async_tags.is_some()) << 15)
            | self.asynchronous.len() as u32;

        let mut words = vec![w0, w1];
        words.extend(&self.source);
        words.extend(&self.system);
        words.extend(&self.vector);
        words.extend(&self.asynchronous);
        if let Some(tags) = &self.async_tags {
            words.extend(tags);
        }
        let mut out = vec![0u8; words.len() * 4];
        BigEndian::write_u32_into(&words, &mut out);
        Ok(out)
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self, PacketError> {
        if b.len() < 8 {
            return Err(PacketError::Truncated { needed: 8, available: b.len() });
        }
        let w0 = BigEndian::read_u32(&b[0..4]);
        let w1 = BigEndian::read_u32(&b[4..8]);
        let counts = [
            ((w0 >> 16) & 0x1FF) as usize,
            (w0 & 0x1FF) as usize,
            ((w1 >> 16) & 0xFFFF) as usize,
            (w1 & 0x7FFF) as usize,
        ];
        let tagged = (w1 >> 15) & 1 != 0;

        let mut at = 8;
        let mut take = |n: usize| -> Result<Vec<u32>, PacketError> {
            let end = at + 4 * n;
            let bytes = b.get(at..end).ok_or(PacketError::Truncated { needed: end, available: b.len() })?;
            at = end;
            Ok(bytes.chunks_exact(4).map(BigEndian::read_u32).collect())
        };
        Ok(Self {
            source: take(counts[0])?,
            system: take(counts[1])?,
            vector: take(counts[2])?,
            asynchronous: take(counts[3])?,
            async_tags: if tagged { Some(take(counts[3])?) } else { None },
        })
    }
}

impl<'a> Packet<'a> {
    fn context_payload(&self) -> Result<&[u8], PacketError> {
        if !self.is_context() {
            return Err(PacketError::WrongPacketKind { expected: "context", found: self.packet_type() });
        }
        Ok(self.payload())
    }

    fn require_version(&self, field: ContextField) -> Result<(), PacketError> {
        if matches!(field, ContextField::Cif1 | ContextField::Cif2) && self.version != Vita49Version::V49_2 {
            return Err(PacketError::Unsupported("CIF1/CIF2 need VITA-49.2"));
        }
        Ok(())
    }

    fn write_cif0(&mut self, cif0: u32) -> Result<(), PacketError> {
        BigEndian::write_u32(&mut self.payload_mut()?[0..4], cif0);
        Ok(())
    }

    pub fn cif0(&self) -> Result<Cif0, PacketError> {
        Ok(Cif0::from_bits_retain(read_cif0(self.context_payload()?)?))
    }

    /// Offset of `field` in the payload; negative when absent.
    pub fn context_offset(&self, field: ContextField) -> Result<i32, PacketError> {
        context_offset(self.context_payload()?, field)
    }

    pub fn has_context_field(&self, field: ContextField) -> Result<bool, PacketError> {
        Ok(self.context_offset(field)? > 0)
    }

    /// Raw bytes of a present field.
    pub fn context_field(&self, field: ContextField) -> Result<Option<&[u8]>, PacketError> {
        self.require_version(field)?;
        let payload = self.context_payload()?;
        let off = context_offset(payload, field)?;
        if off <= 0 {
            return Ok(None);
        }
        let at = off as usize;
        let len = context_field_len(payload, field, at)?;
        let bytes = payload
            .get(at..at + len)
            .ok_or(PacketError::Truncated { needed: at + len, available: payload.len() })?;
        Ok(Some(bytes))
    }

    /// Writes raw field bytes, adding the field or resizing a variable one.
    pub fn set_context_field(&mut self, field: ContextField, bytes: &[u8]) -> Result<(), PacketError> {
        self.require_version(field)?;
        self.store.ensure_writable()?;
        match field.fixed_width() {
            _ if matches!(field, ContextField::Cif0 | ContextField::ContextEnd) => {
                return Err(PacketError::InvalidValue(format!("{field:?} is not a settable field")));
            }
            Some(w) if w != bytes.len() => {
                return Err(PacketError::InvalidValue(format!("{field:?} is {w} bytes, got {}", bytes.len())));
            }
            None if bytes.len() % 4 != 0 => {
                return Err(PacketError::InvalidValue(format!("{field:?} length {} is not word aligned", bytes.len())));
            }
            _ => {}
        }

        let payload = self.context_payload()?;
        let cif0 = read_cif0(payload)?;
        let off = context_offset(payload, field)?;
        let at = off.unsigned_abs() as usize;
        let new_len = bytes.len();

        if off > 0 {
            let old_len = context_field_len(payload, field, at)?;
            if new_len > old_len {
                shift_payload(&mut self.store, at + old_len, new_len - old_len, true)?;
            } else if new_len < old_len {
                shift_payload(&mut self.store, at + new_len, old_len - new_len, false)?;
            }
        } else {
            shift_payload(&mut self.store, at, new_len, true)?;
            self.write_cif0(cif0 | field.bit())?;
        }
        self.payload_mut()?[at..at + new_len].copy_from_slice(bytes);
        Ok(())
    }

    /// Removes a field if present.
    pub fn remove_context_field(&mut self, field: ContextField) -> Result<(), PacketError> {
        self.require_version(field)?;
        self.store.ensure_writable()?;
        let payload = self.context_payload()?;
        let cif0 = read_cif0(payload)?;
        let off = context_offset(payload, field)?;
        if off <= 0 || matches!(field, ContextField::Cif0 | ContextField::ContextEnd) {
            return Ok(());
        }
        let at = off as usize;
        let len = context_field_len(payload, field, at)?;
        shift_payload(&mut self.store, at, len, false)?;
        self.write_cif0(cif0 & !field.bit())
    }

    pub fn change_indicator(&self) -> Result<bool, PacketError> {
        Ok(self.cif0()?.contains(Cif0::CHANGE_INDICATOR))
    }

    pub fn set_change_indicator(&mut self, changed: bool) -> Result<(), PacketError> {
        let mut cif0 = self.cif0()?;
        cif0.set(Cif0::CHANGE_INDICATOR, changed);
        self.write_cif0(cif0.bits())
    }

    // --- typed helpers ---

    fn field_u32(&self, field: ContextField) -> Result<Option<u32>, PacketError> {
        Ok(self.context_field(field)?.map(BigEndian::read_u32))
    }

    fn field_u64(&self, field: ContextField) -> Result<Option<u64>, PacketError> {
        Ok(self.context_field(field)?.map(BigEndian::read_u64))
    }

    fn set_field_u32(&mut self, field: ContextField, value: Option<u32>) -> Result<(), PacketError> {
        match value {
            Some(v) => self.set_context_field(field, &v.to_be_bytes()),
            None => self.remove_context_field(field),
        }
    }

    fn set_field_u64(&mut self, field: ContextField, value: Option<u64>) -> Result<(), PacketError> {
        match value {
            Some(v) => self.set_context_field(field, &v.to_be_bytes()),
            None => self.remove_context_field(field),
        }
    }

    fn hertz(&self, field: ContextField) -> Result<Option<f64>, PacketError> {
        Ok(self.field_u64(field)?.map(|b| from_fixed_i64(b as i64, radix::FREQUENCY)))
    }

    fn set_hertz(&mut self, field: ContextField, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_field_u64(field, hz.map(|v| to_fixed_i64(v, radix::FREQUENCY) as u64))
    }

    fn low_half(&self, field: ContextField, radix: u32) -> Result<Option<f64>, PacketError> {
        Ok(self.field_u32(field)?.map(|w| from_fixed_i16(w as u16 as i16, radix)))
    }

    fn set_low_half(&mut self, field: ContextField, value: Option<f64>, radix: u32) -> Result<(), PacketError> {
        self.set_field_u32(field, value.map(|v| u32::from(to_fixed_i16(v, radix) as u16)))
    }

    // --- typed fields ---

    pub fn reference_point_id(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::ReferencePointId)
    }

    pub fn set_reference_point_id(&mut self, id: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::ReferencePointId, id)
    }

    pub fn bandwidth(&self) -> Result<Option<f64>, PacketError> {
        self.hertz(ContextField::Bandwidth)
    }

    pub fn set_bandwidth(&mut self, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_hertz(ContextField::Bandwidth, hz)
    }

    pub fn if_reference_frequency(&self) -> Result<Option<f64>, PacketError> {
        self.hertz(ContextField::IfReferenceFrequency)
    }

    pub fn set_if_reference_frequency(&mut self, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_hertz(ContextField::IfReferenceFrequency, hz)
    }

    pub fn rf_reference_frequency(&self) -> Result<Option<f64>, PacketError> {
        self.hertz(ContextField::RfReferenceFrequency)
    }

    pub fn set_rf_reference_frequency(&mut self, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_hertz(ContextField::RfReferenceFrequency, hz)
    }

    pub fn rf_reference_frequency_offset(&self) -> Result<Option<f64>, PacketError> {
        self.hertz(ContextField::RfReferenceFrequencyOffset)
    }

    pub fn set_rf_reference_frequency_offset(&mut self, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_hertz(ContextField::RfReferenceFrequencyOffset, hz)
    }

    pub fn if_band_offset(&self) -> Result<Option<f64>, PacketError> {
        self.hertz(ContextField::IfBandOffset)
    }

    pub fn set_if_band_offset(&mut self, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_hertz(ContextField::IfBandOffset, hz)
    }

    pub fn sample_rate(&self) -> Result<Option<f64>, PacketError> {
        self.hertz(ContextField::SampleRate)
    }

    pub fn set_sample_rate(&mut self, hz: Option<f64>) -> Result<(), PacketError> {
        self.set_hertz(ContextField::SampleRate, hz)
    }

    /// dBm.
    pub fn reference_level(&self) -> Result<Option<f64>, PacketError> {
        self.low_half(ContextField::ReferenceLevel, radix::LEVEL)
    }

    pub fn set_reference_level(&mut self, dbm: Option<f64>) -> Result<(), PacketError> {
        self.set_low_half(ContextField::ReferenceLevel, dbm, radix::LEVEL)
    }

    pub fn gain(&self) -> Result<Option<Gain>, PacketError> {
        Ok(self.field_u32(ContextField::Gain)?.map(|w| Gain {
            stage1: from_fixed_i16(w as u16 as i16, radix::LEVEL),
            stage2: from_fixed_i16((w >> 16) as u16 as i16, radix::LEVEL),
        }))
    }

    pub fn set_gain(&mut self, gain: Option<Gain>) -> Result<(), PacketError> {
        let word = gain.map(|g| {
            let s1 = to_fixed_i16(g.stage1, radix::LEVEL) as u16;
            let s2 = to_fixed_i16(g.stage2, radix::LEVEL) as u16;
            (u32::from(s2) << 16) | u32::from(s1)
        });
        self.set_field_u32(ContextField::Gain, word)
    }

    pub fn over_range_count(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::OverRangeCount)
    }

    pub fn set_over_range_count(&mut self, count: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::OverRangeCount, count)
    }

    /// Picoseconds.
    pub fn timestamp_adjustment(&self) -> Result<Option<i64>, PacketError> {
        Ok(self.field_u64(ContextField::TimestampAdjustment)?.map(|v| v as i64))
    }

    pub fn set_timestamp_adjustment(&mut self, ps: Option<i64>) -> Result<(), PacketError> {
        self.set_field_u64(ContextField::TimestampAdjustment, ps.map(|v| v as u64))
    }

    pub fn timestamp_calibration_time(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::TimestampCalibrationTime)
    }

    pub fn set_timestamp_calibration_time(&mut self, secs: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::TimestampCalibrationTime, secs)
    }

    /// Degrees Celsius.
    pub fn temperature(&self) -> Result<Option<f64>, PacketError> {
        self.low_half(ContextField::Temperature, radix::TEMPERATURE)
    }

    pub fn set_temperature(&mut self, celsius: Option<f64>) -> Result<(), PacketError> {
        self.set_low_half(ContextField::Temperature, celsius, radix::TEMPERATURE)
    }

    pub fn device_id(&self) -> Result<Option<DeviceId>, PacketError> {
        Ok(self.field_u64(ContextField::DeviceId)?.map(|v| DeviceId {
            oui: ((v >> 32) as u32) & 0x00FF_FFFF,
            device_code: v as u16,
        }))
    }

    pub fn set_device_id(&mut self, id: Option<DeviceId>) -> Result<(), PacketError> {
        if let Some(d) = id {
            if d.oui > 0x00FF_FFFF {
                return Err(PacketError::InvalidValue(format!("OUI 0x{:x} exceeds 24 bits", d.oui)));
            }
        }
        self.set_field_u64(ContextField::DeviceId, id.map(|d| (u64::from(d.oui) << 32) | u64::from(d.device_code)))
    }

    pub fn state_event_indicators(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::StateEventIndicators)
    }

    pub fn set_state_event_indicators(&mut self, bits: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::StateEventIndicators, bits)
    }

    /// Raw payload-format descriptor (decoding belongs to the sample codec).
    pub fn data_payload_format(&self) -> Result<Option<u64>, PacketError> {
        self.field_u64(ContextField::DataPayloadFormat)
    }

    pub fn set_data_payload_format(&mut self, bits: Option<u64>) -> Result<(), PacketError> {
        self.set_field_u64(ContextField::DataPayloadFormat, bits)
    }

    pub fn ephemeris_reference_id(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::EphemerisReferenceId)
    }

    pub fn set_ephemeris_reference_id(&mut self, id: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::EphemerisReferenceId, id)
    }

    pub fn gps_ascii(&self) -> Result<Option<GpsAscii>, PacketError> {
        self.context_field(ContextField::GpsAscii)?.map(GpsAscii::from_bytes).transpose()
    }

    pub fn set_gps_ascii(&mut self, gps: Option<&GpsAscii>) -> Result<(), PacketError> {
        match gps {
            Some(g) => self.set_context_field(ContextField::GpsAscii, &g.to_bytes()?),
            None => self.remove_context_field(ContextField::GpsAscii),
        }
    }

    pub fn association_lists(&self) -> Result<Option<AssociationLists>, PacketError> {
        self.context_field(ContextField::ContextAssociationLists)?
            .map(AssociationLists::from_bytes)
            .transpose()
    }

    pub fn set_association_lists(&mut self, lists: Option<&AssociationLists>) -> Result<(), PacketError> {
        match lists {
            Some(l) => self.set_context_field(ContextField::ContextAssociationLists, &l.to_bytes()?),
            None => self.remove_context_field(ContextField::ContextAssociationLists),
        }
    }

    /// CIF1 indicator word (VITA-49.2).
    pub fn cif1(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::Cif1)
    }

    pub fn set_cif1(&mut self, word: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::Cif1, word)
    }

    /// CIF2 indicator word (VITA-49.2).
    pub fn cif2(&self) -> Result<Option<u32>, PacketError> {
        self.field_u32(ContextField::Cif2)
    }

    pub fn set_cif2(&mut self, word: Option<u32>) -> Result<(), PacketError> {
        self.set_field_u32(ContextField::Cif2, word)
    }
}
