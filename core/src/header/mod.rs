//! header/mod.rs
//! VRT packet header: typed fields and the optional-field offset algorithm.

pub mod types;
pub mod offsets;

pub use types::*;
pub use offsets::{control_word, header_length, header_offset, presence_vector, HeaderField};
