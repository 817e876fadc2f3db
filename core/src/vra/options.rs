//! vra/options.rs
//! Open/create options for VRA files.
//!
//! Every field has a default, so a partial JSON object is a valid config:
//!
//! ```json
//! { "track_crc": false, "check_mode": "lenient", "version": "49.2" }
//! ```

use serde::{Deserialize, Serialize};

use crate::header::Vita49Version;
use crate::packet::CheckMode;
use crate::types::VrtError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VraOptions {
    /// Keep the header's file length current on every write.
    pub track_length: bool,
    /// Recompute the CRC on every write.
    pub track_crc: bool,
    pub read_only: bool,
    /// Check applied to packets read from the file.
    pub check_mode: CheckMode,
    /// Sub-version attached to packets read from the file.
    pub version: Vita49Version,
}

impl Default for VraOptions {
    fn default() -> Self {
        Self {
            track_length: true,
            track_crc: true,
            read_only: false,
            check_mode: CheckMode::Strict,
            version: Vita49Version::V49_0,
        }
    }
}

impl VraOptions {
    pub fn from_json(json: &str) -> Result<Self, VrtError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_only() -> Self {
        Self { read_only: true, ..Self::default() }
    }

    /// No length or CRC upkeep; header fields stay at their sentinels.
    pub fn untracked() -> Self {
        Self { track_length: false, track_crc: false, ..Self::default() }
    }
}
