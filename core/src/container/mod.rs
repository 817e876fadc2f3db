//! container/mod.rs
//! Packet containers and the iterator that walks them.

pub mod iter;
pub mod slice;

pub use iter::{frame_at, PacketContainer, PacketIterator, ReadMode};
pub use slice::PacketSlice;
