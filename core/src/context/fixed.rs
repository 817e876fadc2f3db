//! context/fixed.rs
//! Bits ↔ real-number conversion for fixed-point context fields.
//!
//! A field with radix point `r` stores `round(value · 2^r)` as a two's
//! complement integer of the field width. Out-of-range values saturate.

#[inline]
fn scale(radix: u32) -> f64 {
    (1u64 << radix) as f64
}

pub fn to_fixed_i64(value: f64, radix: u32) -> i64 {
    (value * scale(radix)).round() as i64
}

pub fn from_fixed_i64(bits: i64, radix: u32) -> f64 {
    bits as f64 / scale(radix)
}

pub fn to_fixed_i32(value: f64, radix: u32) -> i32 {
    (value * scale(radix)).round() as i32
}

pub fn from_fixed_i32(bits: i32, radix: u32) -> f64 {
    bits as f64 / scale(radix)
}

pub fn to_fixed_i16(value: f64, radix: u32) -> i16 {
    (value * scale(radix)).round() as i16
}

pub fn from_fixed_i16(bits: i16, radix: u32) -> f64 {
    f64::from(bits) / scale(radix)
}
