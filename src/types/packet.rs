//! Raw packet and decode envelope types

use serde::Serialize;
use std::time::SystemTime;

use super::{Opcode, RadioId, Record};
use crate::fallback::FallbackResult;

/// One framed diagnostic packet as delivered by the transport.
///
/// Immutable once built; each decode call borrows it and returns owned output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// Schema tag of the payload
    pub opcode: Opcode,

    /// Payload bytes with all framing already stripped
    pub payload: Vec<u8>,

    /// Capture time (already normalized by the transport)
    pub timestamp: SystemTime,

    /// Logical radio the packet was captured on
    pub radio_id: RadioId,
}

impl RawPacket {
    /// Create a new raw packet
    pub fn new(
        opcode: Opcode,
        payload: impl Into<Vec<u8>>,
        timestamp: SystemTime,
        radio_id: RadioId,
    ) -> Self {
        Self { opcode, payload: payload.into(), timestamp, radio_id }
    }
}

static EMPTY_RECORD: Record = Record::Empty;

/// Result of decoding one packet, tagged with its capture context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded {
    pub opcode: Opcode,
    pub timestamp: SystemTime,
    pub radio_id: RadioId,
    pub outcome: DecodeOutcome,
}

/// Either a structured record or the fallback that replaced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DecodeOutcome {
    Record(Record),
    Fallback(FallbackResult),
}

impl Decoded {
    /// The decoded record; fallbacks present as [`Record::Empty`].
    pub fn record(&self) -> &Record {
        match &self.outcome {
            DecodeOutcome::Record(record) => record,
            DecodeOutcome::Fallback(_) => &EMPTY_RECORD,
        }
    }

    /// The fallback result, if decoding did not produce a record.
    pub fn fallback(&self) -> Option<&FallbackResult> {
        match &self.outcome {
            DecodeOutcome::Fallback(fallback) => Some(fallback),
            DecodeOutcome::Record(_) => None,
        }
    }

    /// Returns true when a decoder produced a record.
    pub fn is_record(&self) -> bool {
        matches!(self.outcome, DecodeOutcome::Record(_))
    }
}
