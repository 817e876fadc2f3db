//! packet/trailer.rs
//! The 4-byte data-packet trailer.
//!
//! ```text
//! bit 31-k   enable for indicator k        k = 0..11
//! bit 19-k   indicator k
//! bit 7      associated packet count enable
//! bits 6..0  associated packet count
//! ```

use crate::buffer::shift_trailer;
use crate::constants::TRAILER_LEN;
use crate::packet::types::{Packet, PacketError};

/// Named trailer indicators; 8..11 are user defined.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrailerBit {
    CalibratedTime = 0,
    ValidData = 1,
    ReferenceLock = 2,
    AgcMgc = 3,
    DetectedSignal = 4,
    SpectralInversion = 5,
    OverRange = 6,
    SampleLoss = 7,
    User0 = 8,
    User1 = 9,
    User2 = 10,
    User3 = 11,
}

impl TrailerBit {
    #[inline]
    const fn enable_mask(self) -> u32 {
        1 << (31 - self as u32)
    }

    #[inline]
    const fn indicator_mask(self) -> u32 {
        1 << (19 - self as u32)
    }
}

const COUNT_ENABLE: u32 = 0x80;
const COUNT_MASK: u32 = 0x7F;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Trailer(pub u32);

impl Trailer {
    /// `None` when the indicator's enable bit is clear.
    pub fn get(&self, bit: TrailerBit) -> Option<bool> {
        if self.0 & bit.enable_mask() == 0 {
            return None;
        }
        Some(self.0 & bit.indicator_mask() != 0)
    }

    /// `None` clears both the enable and the indicator bit.
    pub fn set(&mut self, bit: TrailerBit, value: Option<bool>) {
        self.0 &= !(bit.enable_mask() | bit.indicator_mask());
        if let Some(v) = value {
            self.0 |= bit.enable_mask();
            if v {
                self.0 |= bit.indicator_mask();
            }
        }
    }

    pub fn associated_packet_count(&self) -> Option<u8> {
        if self.0 & COUNT_ENABLE == 0 {
            return None;
        }
        Some((self.0 & COUNT_MASK) as u8)
    }

    pub fn set_associated_packet_count(&mut self, count: Option<u8>) -> Result<(), PacketError> {
        self.0 &= !(COUNT_ENABLE | COUNT_MASK);
        match count {
            Some(c) if u32::from(c) > COUNT_MASK => {
                Err(PacketError::InvalidValue(format!("associated packet count {c} exceeds 127")))
            }
            Some(c) => {
                self.0 |= COUNT_ENABLE | u32::from(c);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn to_bytes(self) -> [u8; TRAILER_LEN] {
        self.0.to_be_bytes()
    }
}

impl Packet<'_> {
    #[inline]
    pub fn has_trailer(&self) -> bool {
        self.store.trailer_len() > 0
    }

    pub fn trailer(&self) -> Option<Trailer> {
        let t = self.store.trailer();
        let bytes: [u8; TRAILER_LEN] = t.try_into().ok()?;
        Some(Trailer(u32::from_be_bytes(bytes)))
    }

    /// Adds, rewrites or (with `None`) removes the trailer.
    pub fn set_trailer(&mut self, trailer: Option<Trailer>) -> Result<(), PacketError> {
        self.store.ensure_writable()?;
        match trailer {
            Some(t) => {
                shift_trailer(&mut self.store, TRAILER_LEN as i32)?;
                self.store.trailer_mut()?.copy_from_slice(&t.to_bytes());
            }
            None => shift_trailer(&mut self.store, -(TRAILER_LEN as i32))?,
        }
        Ok(())
    }

    /// Sets one indicator, adding the trailer when needed.
    pub fn set_trailer_bit(&mut self, bit: TrailerBit, value: Option<bool>) -> Result<(), PacketError> {
        let mut t = self.trailer().unwrap_or_default();
        t.set(bit, value);
        self.set_trailer(Some(t))
    }

    pub fn trailer_bit(&self, bit: TrailerBit) -> Option<bool> {
        self.trailer().and_then(|t| t.get(bit))
    }
}
