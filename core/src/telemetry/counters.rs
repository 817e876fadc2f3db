//! telemetry/counters.rs
//! Counters collected while walking packet containers.
//!
//! Summary: iterators and VRA files add to a `ScanCounters` as they read,
//! skip, remove and checksum. Counters from separate scans merge by
//! addition.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Deterministic counters collected during container scans
#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanCounters {
    pub packets_read: u64,
    pub packets_skipped: u64,
    pub packets_removed: u64,
    pub packets_invalid: u64,
    /// Packet bytes copied out of a container.
    pub bytes_read: u64,
    /// Bytes fed through the file CRC.
    pub crc_bytes: u64,
}

impl ScanCounters {
    /// Record one packet read in full.
    pub fn add_read(&mut self, packet_len: usize) {
        self.packets_read += 1;
        self.bytes_read += packet_len as u64;
    }

    /// Record one packet stepped over after reading its header only.
    /// - `header_len`: bytes actually copied
    pub fn add_skip(&mut self, header_len: usize) {
        self.packets_skipped += 1;
        self.bytes_read += header_len as u64;
    }

    pub fn add_removed(&mut self) {
        self.packets_removed += 1;
    }

    pub fn add_invalid(&mut self) {
        self.packets_invalid += 1;
    }

    pub fn add_crc(&mut self, len: usize) {
        self.crc_bytes += len as u64;
    }

    /// Packets visited either way.
    pub fn packets_seen(&self) -> u64 {
        self.packets_read + self.packets_skipped
    }

    pub fn merge(&mut self, other: &ScanCounters) {
        self.packets_read += other.packets_read;
        self.packets_skipped += other.packets_skipped;
        self.packets_removed += other.packets_removed;
        self.packets_invalid += other.packets_invalid;

        self.bytes_read += other.bytes_read;
        self.crc_bytes += other.crc_bytes;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl AddAssign for ScanCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
