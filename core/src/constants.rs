//! constants.rs
//! Wire constants shared by the packet codec and the VRA container.
//!
//! All multi-byte integers on the wire are big-endian.

/// Alignment word opening every VRA file ("VRAF").
pub const VRA_FAW: [u8; 4] = *b"VRAF";
/// The only VRA container version this crate writes.
pub const VRA_VERSION: u8 = 1;
/// Fixed VRA header size in bytes.
pub const VRA_HEADER_LEN: usize = 20;
/// Byte offset of the CRC field inside the VRA header.
pub const VRA_CRC_OFFSET: usize = 16;
/// CRC value meaning "not computed".
pub const VRA_CRC_SENTINEL: u32 = 0xFFFF_FFFF;
/// File length value meaning "ask the storage layer".
pub const VRA_LENGTH_UNSET: u64 = 0;
/// File extension for VRA files.
pub const VRA_EXTENSION: &str = "vra";
/// MIME type for VRA files.
pub const VRA_MIME_TYPE: &str = "application/x-vita-radio-archive";

/// Reflected form of the CRC-32 polynomial 0x04C11DB7.
pub const CRC32_POLY_REFLECTED: u32 = 0xEDB8_8320;
/// Chunk size used when reading file contents back for the CRC.
pub const CRC_CHUNK_SIZE: usize = 4 * 1024;

/// Minimum packet header (the two control bytes plus the length field).
pub const MIN_HEADER_LEN: usize = 4;
/// Largest possible header: prologue + stream id + class id + both timestamps.
pub const MAX_HEADER_LEN: usize = 28;
/// Trailer size when present.
pub const TRAILER_LEN: usize = 4;
/// Largest packet expressible by the 16-bit word count.
pub const MAX_PACKET_LEN: usize = 0xFFFF * 4;

/// Owned payload regions grow in steps of this many bytes.
pub const PAYLOAD_GROWTH_STEP: usize = 4 * 1024;

/// Header field widths in bytes.
pub mod header_widths {
    pub const STREAM_ID: usize = 4;
    pub const CLASS_ID: usize = 8;
    pub const INTEGER_TIME: usize = 4;
    pub const FRACTIONAL_TIME: usize = 8;
}

/// Default header prologues for freshly built packets.
pub mod defaults {
    /// Data packet with stream id, class id, trailer, UTC + real-time stamps.
    pub const DATA_PROLOGUE: [u8; 4] = [0x1C, 0x60, 0x00, 0x08];
    /// Context packet with stream id, class id, UTC + real-time stamps.
    pub const CONTEXT_PROLOGUE: [u8; 4] = [0x48, 0x60, 0x00, 0x08];
}

/// Fixed-point radix points used by the context field contract.
pub mod radix {
    /// 64-bit frequencies and rates, Hz.
    pub const FREQUENCY: u32 = 20;
    /// 16-bit levels and gains, dB / dBm.
    pub const LEVEL: u32 = 7;
    /// 16-bit temperature, degrees Celsius.
    pub const TEMPERATURE: u32 = 6;
}
