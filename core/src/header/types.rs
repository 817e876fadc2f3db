//! header/types.rs
//! Typed views of the VRT header prologue and its optional fields.
//!
//! Design notes:
//! - Byte 0: packet type (7..4), class-id present (3), trailer present (2,
//!   data only), time-stamp mode (0, context only).
//! - Byte 1: integer time code (7..6), fractional time code (5..4), packet
//!   count (3..0).
//! - Bytes 2..4: packet length in 32-bit words.

use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};

use crate::packet::PacketError;

/// Packet type nibble.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
pub enum PacketType {
    UnidentifiedData = 0,
    Data = 1,
    UnidentifiedExtData = 2,
    ExtData = 3,
    Context = 4,
    ExtContext = 5,
    #[num_enum(catch_all)]
    Reserved(u8),
}

impl PacketType {
    /// Types 0..=3 carry samples and may carry a trailer.
    #[inline]
    pub fn is_data(self) -> bool {
        u8::from(self) < 4
    }

    #[inline]
    pub fn is_context(self) -> bool {
        matches!(self, PacketType::Context | PacketType::ExtContext)
    }

    /// Types with bit 0 or bit 2 of the nibble set carry a stream id, which
    /// leaves out the two "unidentified" data types.
    #[inline]
    pub fn has_stream_id(self) -> bool {
        (u8::from(self) & 0x5) != 0
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        matches!(self, PacketType::Reserved(_))
    }

    /// Reads the type nibble out of header byte 0.
    #[inline]
    pub fn from_byte0(b0: u8) -> Self {
        PacketType::from(b0 >> 4)
    }
}

/// Integer time-stamp code (TSI).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
pub enum IntegerMode {
    #[default]
    None = 0,
    Utc = 1,
    Gps = 2,
    Other = 3,
}

/// Fractional time-stamp code (TSF).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
pub enum FractionalMode {
    #[default]
    None = 0,
    SampleCount = 1,
    RealTime = 2,
    FreeRunning = 3,
}

/// VITA-49 sub-version negotiated for a packet or file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vita49Version {
    #[default]
    #[serde(rename = "49.0")]
    V49_0,
    #[serde(rename = "49.2")]
    V49_2,
}

/// Class identifier: pad bit count, OUI, information class, packet class.
///
/// Wire form (8 bytes): `[pad:5|rsvd:3] [OUI:24] [ICC:16] [PCC:16]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClassId {
    pub pad_bits: u8,
    pub oui: u32,
    pub icc: u16,
    pub pcc: u16,
}

impl ClassId {
    pub const LEN: usize = 8;

    pub fn new(oui: u32, icc: u16, pcc: u16) -> Result<Self, PacketError> {
        if oui > 0x00FF_FFFF {
            return Err(PacketError::InvalidValue(format!("OUI 0x{oui:x} exceeds 24 bits")));
        }
        Ok(Self { pad_bits: 0, oui, icc, pcc })
    }

    pub fn with_pad_bits(mut self, pad_bits: u8) -> Result<Self, PacketError> {
        if pad_bits > 0x1F {
            return Err(PacketError::InvalidValue(format!("pad bit count {pad_bits} exceeds 5 bits")));
        }
        self.pad_bits = pad_bits;
        Ok(self)
    }

    pub fn from_bytes(b: &[u8; 8]) -> Self {
        Self {
            pad_bits: b[0] >> 3,
            oui: u32::from_be_bytes([0, b[1], b[2], b[3]]),
            icc: u16::from_be_bytes([b[4], b[5]]),
            pcc: u16::from_be_bytes([b[6], b[7]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let oui = self.oui.to_be_bytes();
        let icc = self.icc.to_be_bytes();
        let pcc = self.pcc.to_be_bytes();
        [
            (self.pad_bits & 0x1F) << 3,
            oui[1], oui[2], oui[3],
            icc[0], icc[1],
            pcc[0], pcc[1],
        ]
    }

    /// OUI/ICC/PCC packed as one integer, pad bits excluded. Used as the
    /// factory registry key.
    pub fn key(&self) -> u64 {
        ((self.oui as u64) << 32) | ((self.icc as u64) << 16) | self.pcc as u64
    }
}

/// Opaque time value as consumed by the codec.
///
/// Calendar and leap-second arithmetic live outside this crate; the codec
/// only moves the two raw fields and their mode codes.
pub trait TimeSource {
    fn integer_mode(&self) -> IntegerMode;
    fn fractional_mode(&self) -> FractionalMode;
    fn seconds(&self) -> u32;
    fn fractional(&self) -> u64;
}

/// Plain time-stamp as carried in the header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimeStamp {
    pub integer_mode: IntegerMode,
    pub fractional_mode: FractionalMode,
    pub seconds: u32,
    pub fractional: u64,
}

impl TimeStamp {
    pub fn utc(seconds: u32, picoseconds: u64) -> Self {
        Self {
            integer_mode: IntegerMode::Utc,
            fractional_mode: FractionalMode::RealTime,
            seconds,
            fractional: picoseconds,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl TimeSource for TimeStamp {
    fn integer_mode(&self) -> IntegerMode {
        self.integer_mode
    }
    fn fractional_mode(&self) -> FractionalMode {
        self.fractional_mode
    }
    fn seconds(&self) -> u32 {
        self.seconds
    }
    fn fractional(&self) -> u64 {
        self.fractional
    }
}
