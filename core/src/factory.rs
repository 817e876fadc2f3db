//! factory.rs
//! `{packet type, class id} → packet variant` dispatch.
//!
//! Design notes:
//! - Variants form a closed enum; callers match on it instead of down-casting.
//! - The registry maps `(type, Some(class key))` or `(type, None)` to a
//!   constructor. Lookup tries the exact class first, then the type alone,
//!   then falls back to the built-in variant for the type.

use std::collections::HashMap;

use tracing::trace;

use crate::header::PacketType;
use crate::packet::Packet;

/// A packet sorted by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketVariant {
    Data(Packet<'static>),
    ExtData(Packet<'static>),
    Context(Packet<'static>),
    ExtContext(Packet<'static>),
    /// Reserved packet types.
    Unknown(Packet<'static>),
}

impl PacketVariant {
    /// Built-in variant for the packet's type.
    pub fn classify(packet: Packet<'static>) -> Self {
        match packet.packet_type() {
            PacketType::UnidentifiedData | PacketType::Data => PacketVariant::Data(packet),
            PacketType::UnidentifiedExtData | PacketType::ExtData => PacketVariant::ExtData(packet),
            PacketType::Context => PacketVariant::Context(packet),
            PacketType::ExtContext => PacketVariant::ExtContext(packet),
            PacketType::Reserved(_) => PacketVariant::Unknown(packet),
        }
    }

    pub fn packet(&self) -> &Packet<'static> {
        match self {
            PacketVariant::Data(p)
            | PacketVariant::ExtData(p)
            | PacketVariant::Context(p)
            | PacketVariant::ExtContext(p)
            | PacketVariant::Unknown(p) => p,
        }
    }

    pub fn into_packet(self) -> Packet<'static> {
        match self {
            PacketVariant::Data(p)
            | PacketVariant::ExtData(p)
            | PacketVariant::Context(p)
            | PacketVariant::ExtContext(p)
            | PacketVariant::Unknown(p) => p,
        }
    }
}

pub type Constructor = fn(Packet<'static>) -> PacketVariant;

#[derive(Default, Clone)]
pub struct PacketFactory {
    registry: HashMap<(PacketType, Option<u64>), Constructor>,
}

impl PacketFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ctor` for a type, optionally narrowed to one class id
    /// (`ClassId::key`). Returns the constructor it replaced.
    pub fn register(&mut self, packet_type: PacketType, class_key: Option<u64>, ctor: Constructor) -> Option<Constructor> {
        self.registry.insert((packet_type, class_key), ctor)
    }

    pub fn resolve(&self, packet_type: PacketType, class_key: Option<u64>) -> Option<Constructor> {
        class_key
            .and_then(|k| self.registry.get(&(packet_type, Some(k))))
            .or_else(|| self.registry.get(&(packet_type, None)))
            .copied()
    }

    pub fn create(&self, packet: Packet<'static>) -> PacketVariant {
        let packet_type = packet.packet_type();
        let class_key = packet.class_id().map(|c| c.key());
        match self.resolve(packet_type, class_key) {
            Some(ctor) => {
                trace!(?packet_type, ?class_key, "registered constructor");
                ctor(packet)
            }
            None => PacketVariant::classify(packet),
        }
    }
}
