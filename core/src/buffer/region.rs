//! buffer/region.rs
//! One backing region of a packet (header, payload or trailer bytes).
//!
//! Design notes:
//! - `Owned` regions belong to the packet and may grow.
//! - `Borrowed` regions alias a caller buffer ("direct" mode). They never
//!   reallocate; growing past the slice is a capacity error.
//! - `Shared` regions are read-only views; every mutable access fails.

use crate::packet::PacketError;

#[derive(Debug)]
pub enum Region<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
    Shared(&'a [u8]),
}

impl<'a> Region<'a> {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Region::Owned(v) => v.as_slice(),
            Region::Borrowed(b) => b,
            Region::Shared(b) => b,
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8], PacketError> {
        match self {
            Region::Owned(v) => Ok(v.as_mut_slice()),
            Region::Borrowed(b) => Ok(b),
            Region::Shared(_) => Err(PacketError::ReadOnly),
        }
    }

    /// Bytes currently addressable in this region.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.as_slice().len()
    }

    /// True when the bytes belong to the caller.
    #[inline]
    pub fn is_direct(&self) -> bool {
        !matches!(self, Region::Owned(_))
    }

    /// Makes at least `needed` bytes addressable. Owned regions grow in
    /// multiples of `step`; new bytes are zero.
    pub fn reserve(&mut self, needed: usize, step: usize) -> Result<(), PacketError> {
        match self {
            Region::Owned(v) => {
                if v.len() < needed {
                    v.resize(round_up(needed, step), 0);
                }
                Ok(())
            }
            Region::Borrowed(b) => {
                if b.len() < needed {
                    return Err(PacketError::CapacityExceeded { needed, capacity: b.len() });
                }
                Ok(())
            }
            Region::Shared(_) => Err(PacketError::ReadOnly),
        }
    }

    /// Drops owned capacity beyond `keep` rounded up to `step`. Direct
    /// regions keep their size.
    pub fn release(&mut self, keep: usize, step: usize) {
        if let Region::Owned(v) = self {
            let target = round_up(keep, step);
            if v.len() > target {
                v.truncate(target);
            }
        }
    }
}

#[inline]
pub fn round_up(n: usize, step: usize) -> usize {
    if step <= 1 {
        return n;
    }
    n.div_ceil(step) * step
}
