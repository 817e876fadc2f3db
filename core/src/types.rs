//! types.rs
//! Unified error for container-level operations.
//!
//! - `From<T>` impls let `?` carry packet, header, I/O and config errors.
//! - `Corrupt` is structural invalidity discovered in the middle of a
//!   multi-step read, escalated to a hard failure.

use std::io;

use thiserror::Error;

use crate::packet::{InvalidReason, PacketError};
use crate::vra::VraHeaderError;

#[derive(Debug, Error)]
pub enum VrtError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    #[error("VRA header error: {0}")]
    Header(#[from] VraHeaderError),

    #[error("corrupt packet at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: InvalidReason },

    #[error("container is read-only")]
    ReadOnly,

    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
