//! buffer/mod.rs
//! Packet byte storage and the shift engine that edits it in place.

pub mod region;
pub mod store;
pub mod shift;

pub use region::Region;
pub use shift::{shift_header, shift_payload, shift_trailer};
pub use store::{SegmentedStore, Slot};
