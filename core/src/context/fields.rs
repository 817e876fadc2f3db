//! context/fields.rs
//! CIF0 field identifiers and the width sub-masks used by the offset math.
//!
//! Wire order follows bit order: bit 30 first, bit 8 last. The CIF1/CIF2
//! indicator words (VITA-49.2) sit right after CIF0, ahead of every field.

bitflags::bitflags! {
    /// ## 🚩 CIF0 word (presence + indicator bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Cif0: u32 {
        /// Context field change indicator (not a field)
        const CHANGE_INDICATOR = 1 << 31;
        const REFERENCE_POINT_ID = 1 << 30;
        const BANDWIDTH = 1 << 29;
        const IF_REFERENCE_FREQUENCY = 1 << 28;
        const RF_REFERENCE_FREQUENCY = 1 << 27;
        const RF_REFERENCE_FREQUENCY_OFFSET = 1 << 26;
        const IF_BAND_OFFSET = 1 << 25;
        const REFERENCE_LEVEL = 1 << 24;
        const GAIN = 1 << 23;
        const OVER_RANGE_COUNT = 1 << 22;
        const SAMPLE_RATE = 1 << 21;
        const TIMESTAMP_ADJUSTMENT = 1 << 20;
        const TIMESTAMP_CALIBRATION_TIME = 1 << 19;
        const TEMPERATURE = 1 << 18;
        const DEVICE_ID = 1 << 17;
        const STATE_EVENT_INDICATORS = 1 << 16;
        const DATA_PAYLOAD_FORMAT = 1 << 15;
        const FORMATTED_GPS = 1 << 14;
        const FORMATTED_INS = 1 << 13;
        const ECEF_EPHEMERIS = 1 << 12;
        const RELATIVE_EPHEMERIS = 1 << 11;
        const EPHEMERIS_REFERENCE_ID = 1 << 10;
        const GPS_ASCII = 1 << 9;
        const CONTEXT_ASSOCIATION_LISTS = 1 << 8;
        /// CIF2 indicator word follows CIF0 (VITA-49.2)
        const CIF2_ENABLE = 1 << 2;
        /// CIF1 indicator word follows CIF0 (VITA-49.2)
        const CIF1_ENABLE = 1 << 1;
    }
}

/// A field addressed by the context offset algorithm. The discriminant is
/// the field's single CIF0 bit; `Cif0` itself is 0 and `ContextEnd` uses
/// the otherwise unused bit 0.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextField {
    Cif0 = 0,
    ReferencePointId = 1 << 30,
    Bandwidth = 1 << 29,
    IfReferenceFrequency = 1 << 28,
    RfReferenceFrequency = 1 << 27,
    RfReferenceFrequencyOffset = 1 << 26,
    IfBandOffset = 1 << 25,
    ReferenceLevel = 1 << 24,
    Gain = 1 << 23,
    OverRangeCount = 1 << 22,
    SampleRate = 1 << 21,
    TimestampAdjustment = 1 << 20,
    TimestampCalibrationTime = 1 << 19,
    Temperature = 1 << 18,
    DeviceId = 1 << 17,
    StateEventIndicators = 1 << 16,
    DataPayloadFormat = 1 << 15,
    FormattedGps = 1 << 14,
    FormattedIns = 1 << 13,
    EcefEphemeris = 1 << 12,
    RelativeEphemeris = 1 << 11,
    EphemerisReferenceId = 1 << 10,
    GpsAscii = 1 << 9,
    ContextAssociationLists = 1 << 8,
    Cif2 = 1 << 2,
    Cif1 = 1 << 1,
    /// End of the field area (pseudo field).
    ContextEnd = 1,
}

/// Fields occupying bits 30..8.
pub const FIELD_BITS: u32 = 0x7FFF_FF00;
/// 4-byte fields.
pub const CTX_4: u32 = (1 << 30) | (1 << 24) | (1 << 23) | (1 << 22) | (1 << 19) | (1 << 18) | (1 << 16) | (1 << 10);
/// 8-byte fields, plus the 8-byte part of the two 52-byte ephemeris fields.
pub const CTX_8: u32 = (1 << 29)
    | (1 << 28)
    | (1 << 27)
    | (1 << 26)
    | (1 << 25)
    | (1 << 21)
    | (1 << 20)
    | (1 << 17)
    | (1 << 15)
    | (1 << 12)
    | (1 << 11);
/// 44-byte fields, plus the 44-byte part of the 52-byte ephemeris fields.
pub const CTX_44: u32 = (1 << 14) | (1 << 13) | (1 << 12) | (1 << 11);
/// CIF1/CIF2 enable bits.
pub const CIF_WORDS: u32 = (1 << 2) | (1 << 1);
/// Variable-length fields.
pub const GPS_ASCII_BIT: u32 = 1 << 9;
pub const ASSOCIATION_BIT: u32 = 1 << 8;

impl ContextField {
    /// Every real CIF0 field in wire order.
    pub const FIELDS: [ContextField; 23] = [
        ContextField::ReferencePointId,
        ContextField::Bandwidth,
        ContextField::IfReferenceFrequency,
        ContextField::RfReferenceFrequency,
        ContextField::RfReferenceFrequencyOffset,
        ContextField::IfBandOffset,
        ContextField::ReferenceLevel,
        ContextField::Gain,
        ContextField::OverRangeCount,
        ContextField::SampleRate,
        ContextField::TimestampAdjustment,
        ContextField::TimestampCalibrationTime,
        ContextField::Temperature,
        ContextField::DeviceId,
        ContextField::StateEventIndicators,
        ContextField::DataPayloadFormat,
        ContextField::FormattedGps,
        ContextField::FormattedIns,
        ContextField::EcefEphemeris,
        ContextField::RelativeEphemeris,
        ContextField::EphemerisReferenceId,
        ContextField::GpsAscii,
        ContextField::ContextAssociationLists,
    ];

    #[inline]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Fixed byte width, `None` for the variable-length fields and the
    /// pseudo fields.
    pub const fn fixed_width(self) -> Option<usize> {
        if let ContextField::Cif1 | ContextField::Cif2 = self {
            return Some(4);
        }
        let b = self as u32 & FIELD_BITS;
        let w = 4 * ((b & CTX_4 != 0) as usize)
            + 8 * ((b & CTX_8 != 0) as usize)
            + 44 * ((b & CTX_44 != 0) as usize);
        if w == 0 {
            None
        } else {
            Some(w)
        }
    }

    #[inline]
    pub const fn is_variable(self) -> bool {
        matches!(self, ContextField::GpsAscii | ContextField::ContextAssociationLists)
    }
}
