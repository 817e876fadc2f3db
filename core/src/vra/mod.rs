//! vra/mod.rs
//! VRA file container: header codec, CRC, options and the file itself.

pub mod header;
pub mod crc;
pub mod options;
pub mod file;

pub use crc::{crc_of_bytes, crc_of_reader, reverse_bits_32, VraCrc};
pub use file::{FileCheck, FileInvalidReason, Storage, VraFile};
pub use header::{VraHeader, VraHeaderError};
pub use options::VraOptions;
