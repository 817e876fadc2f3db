//! packet/types.rs
//! The `Packet` handle, its constructors and the packet-level errors.
//!
//! Design notes:
//! - A packet is a `SegmentedStore` plus the VITA-49 sub-version used for
//!   reserved-bit checks and CIF1/CIF2 support.
//! - Lifetimes carry the aliasing rules: `Packet<'static>` owns its bytes,
//!   `Packet<'a>` built by `wrap`/`view` borrows caller memory for `'a`.
//! - Copying constructors run a lenient validity check so a packet never
//!   starts out with a length field that disagrees with its buffers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::{Region, SegmentedStore};
use crate::constants::defaults::{CONTEXT_PROLOGUE, DATA_PROLOGUE};
use crate::constants::{MAX_HEADER_LEN, MIN_HEADER_LEN, TRAILER_LEN};
use crate::header::{PacketType, Vita49Version};
use crate::packet::validate::check_store;

/// Why a packet failed its structural check. First failure wins.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    #[error("reserved header bits are set")]
    ReservedBits,
    #[error("reserved class-id bits are set")]
    ClassIdReservedBits,
    #[error("length: packet length {declared} is below header + trailer ({minimum})")]
    Length { declared: usize, minimum: usize },
    #[error("expected length {expected}, packet declares {actual}")]
    ExpectedLength { expected: usize, actual: usize },
    #[error("declared length {declared} exceeds the {available} bytes available")]
    BufferTooShort { declared: usize, available: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet is read-only")]
    ReadOnly,

    #[error("capacity exceeded: need {needed} bytes, buffer holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("packet would be {bytes} bytes, above the 16-bit word count limit")]
    PacketTooLong { bytes: usize },

    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    #[error("operation needs a {expected} packet, found {found:?}")]
    WrongPacketKind { expected: &'static str, found: PacketType },

    #[error("truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("invalid packet: {0}")]
    Invalid(#[from] InvalidReason),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Strict checks reserved bits; lenient skips them (mid-construction).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    Strict,
    Lenient,
}

/// One VRT packet over owned, borrowed or shared bytes.
#[derive(Debug, Clone)]
pub struct Packet<'a> {
    pub(crate) store: SegmentedStore<'a>,
    pub(crate) version: Vita49Version,
}

fn default_bytes(prologue: [u8; 4]) -> Vec<u8> {
    let total = u16::from_be_bytes([prologue[2], prologue[3]]) as usize * 4;
    let mut bytes = vec![0u8; total];
    bytes[..4].copy_from_slice(&prologue);
    bytes
}

impl Packet<'static> {
    /// Default data packet: `1C 60 00 08`, 28-byte header, empty payload,
    /// 4-byte trailer.
    pub fn new_data() -> Self {
        Self::from_store(SegmentedStore::single(Region::Owned(default_bytes(DATA_PROLOGUE))))
    }

    /// Default context packet: `48 60 00 08`, 28-byte header, CIF0 = 0.
    pub fn new_context() -> Self {
        Self::from_store(SegmentedStore::single(Region::Owned(default_bytes(CONTEXT_PROLOGUE))))
    }

    /// Default packet of any defined type. Data types start from the data
    /// default, context types from the context default; the stream id is
    /// dropped for the unidentified data types.
    pub fn new(packet_type: PacketType) -> Result<Self, PacketError> {
        if packet_type.is_reserved() {
            return Err(PacketError::Unsupported("reserved packet type"));
        }
        let mut packet = if packet_type.is_data() { Self::new_data() } else { Self::new_context() };
        packet.set_packet_type(packet_type)?;
        Ok(packet)
    }

    /// Copies `bytes` (at least the declared packet length) into a fresh
    /// owned packet. Bytes past the declared length are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < MIN_HEADER_LEN {
            return Err(PacketError::Truncated { needed: MIN_HEADER_LEN, available: bytes.len() });
        }
        let declared = u16::from_be_bytes([bytes[2], bytes[3]]) as usize * 4;
        let used = declared.min(bytes.len()).max(MIN_HEADER_LEN);
        let packet = Self::from_store(SegmentedStore::single(Region::Owned(bytes[..used].to_vec())));
        check_store(&packet.store, CheckMode::Lenient, packet.version, None)?;
        Ok(packet)
    }

    /// Copies separately held header, payload and trailer bytes into three
    /// owned regions.
    pub fn copy_parts(header: &[u8], payload: &[u8], trailer: Option<&[u8]>) -> Result<Self, PacketError> {
        if header.len() < MIN_HEADER_LEN || header.len() > MAX_HEADER_LEN {
            return Err(PacketError::InvalidValue(format!("header of {} bytes", header.len())));
        }
        let trailer = match trailer {
            Some(t) if t.len() != TRAILER_LEN => {
                return Err(PacketError::InvalidValue(format!("trailer of {} bytes", t.len())))
            }
            Some(t) => Some(Region::Owned(t.to_vec())),
            None => None,
        };
        let store = SegmentedStore::from_regions(
            Region::Owned(header.to_vec()),
            Some(Region::Owned(payload.to_vec())),
            trailer,
        );
        let packet = Self::from_store(store);
        check_store(&packet.store, CheckMode::Lenient, packet.version, None)?;
        Ok(packet)
    }
}

impl<'a> Packet<'a> {
    pub(crate) fn from_store(store: SegmentedStore<'a>) -> Self {
        Self { store, version: Vita49Version::default() }
    }

    /// Works directly on `buf`. Growing past `buf.len()` fails with
    /// `CapacityExceeded`.
    pub fn wrap(buf: &'a mut [u8]) -> Result<Self, PacketError> {
        if buf.len() < MIN_HEADER_LEN {
            return Err(PacketError::Truncated { needed: MIN_HEADER_LEN, available: buf.len() });
        }
        let packet = Self::from_store(SegmentedStore::single(Region::Borrowed(buf)));
        check_store(&packet.store, CheckMode::Lenient, packet.version, None)?;
        Ok(packet)
    }

    /// Direct mode over separately held regions.
    pub fn wrap_parts(
        header: &'a mut [u8],
        payload: &'a mut [u8],
        trailer: Option<&'a mut [u8]>,
    ) -> Result<Self, PacketError> {
        if header.len() < MIN_HEADER_LEN {
            return Err(PacketError::Truncated { needed: MIN_HEADER_LEN, available: header.len() });
        }
        let store = SegmentedStore::from_regions(
            Region::Borrowed(header),
            Some(Region::Borrowed(payload)),
            trailer.map(Region::Borrowed),
        );
        let packet = Self::from_store(store);
        check_store(&packet.store, CheckMode::Lenient, packet.version, None)?;
        Ok(packet)
    }

    /// Read-only view over `buf`; every mutator returns `ReadOnly`.
    pub fn view(buf: &'a [u8]) -> Result<Self, PacketError> {
        if buf.len() < MIN_HEADER_LEN {
            return Err(PacketError::Truncated { needed: MIN_HEADER_LEN, available: buf.len() });
        }
        let packet = Self::from_store(SegmentedStore::single(Region::Shared(buf)));
        check_store(&packet.store, CheckMode::Lenient, packet.version, None)?;
        Ok(packet)
    }

    pub fn with_version(mut self, version: Vita49Version) -> Self {
        self.version = version;
        self
    }

    #[inline]
    pub fn version(&self) -> Vita49Version {
        self.version
    }

    pub fn into_read_only(mut self) -> Self {
        self.store.set_read_only(true);
        self
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    /// True when the packet aliases caller memory.
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.store.is_direct()
    }

    /// Owned, writable copy that no longer borrows anything.
    pub fn to_owned_packet(&self) -> Packet<'static> {
        let mut store = self.store.to_owned_store();
        store.set_read_only(false);
        Packet { store, version: self.version }
    }

    /// Contiguous wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.store.to_vec()
    }
}

impl PartialEq for Packet<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.store.header_bytes() == other.store.header_bytes()
            && self.store.payload() == other.store.payload()
            && self.store.trailer() == other.store.trailer()
    }
}

impl Eq for Packet<'_> {}
