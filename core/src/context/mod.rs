//! context/mod.rs
//! Context packet payloads: CIF0 fields, their offsets and typed access.

pub mod fields;
pub mod offsets;
pub mod access;
pub mod fixed;

pub use access::{AssociationLists, DeviceId, Gain, GpsAscii};
pub use fields::{Cif0, ContextField};
pub use offsets::{context_end, context_field_len, context_offset, read_cif0};
