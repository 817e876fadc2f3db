//! packet/mod.rs
//! The VRT packet: constructors, field accessors, trailer and validity.

pub mod types;
pub mod access;
pub mod trailer;
pub mod validate;

pub use trailer::{Trailer, TrailerBit};
pub use types::{CheckMode, InvalidReason, Packet, PacketError};
pub use validate::{check_packet, reserved_byte0_mask, reserved_class_id_mask};
