//! vrt-core
//!
//! VITA-49 (VRT) packet codec and VRA file container.
//! Synchronous, single-threaded, no unsafe code.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Packet layout
pub mod buffer;
pub mod header;
pub mod packet;
pub mod context;

// Containers
pub mod container;
pub mod vra;

pub mod factory;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::container::{PacketContainer, PacketIterator, PacketSlice, ReadMode};
    pub use crate::context::{AssociationLists, Cif0, ContextField, DeviceId, Gain, GpsAscii};
    pub use crate::factory::{PacketFactory, PacketVariant};
    pub use crate::header::{
        ClassId, FractionalMode, HeaderField, IntegerMode, PacketType, TimeSource, TimeStamp, Vita49Version,
    };
    pub use crate::packet::{CheckMode, InvalidReason, Packet, PacketError, Trailer, TrailerBit};
    pub use crate::telemetry::ScanCounters;
    pub use crate::types::VrtError;
    pub use crate::vra::{FileCheck, FileInvalidReason, VraFile, VraHeader, VraOptions};
}
