//! telemetry/mod.rs
//! Scan telemetry: counters accumulated by packet iterators and VRA files.
//!
//! Notes:
//! - Counters are plain integers owned by the scanning object; no atomics.
//! - Counters from independent scans combine with `merge` / `+=`.

pub mod counters;

pub use counters::*;
