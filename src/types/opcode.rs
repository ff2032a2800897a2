//! Opcode, format version and radio identifier newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Samsung SDM command group carrying EDGE (2G) data.
pub const SDM_GROUP_EDGE: u8 = 0x03;

/// Integer tag identifying a diagnostic message's schema (the dispatch key).
///
/// Samsung SDM packets are keyed as `(command_group << 8) | command`;
/// Qualcomm DIAG packets use their 16-bit log code directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Opcode(pub u32);

impl Opcode {
    /// Create an opcode from its raw value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Build the opcode of a Samsung SDM command.
    pub const fn sdm(group: u8, command: u8) -> Self {
        Self(((group as u32) << 8) | command as u32)
    }

    /// Get the raw u32 value.
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Opcode {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X}", self.0)
    }
}

/// Version discriminator embedded in a packet header, scoped per opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatVersion(pub u32);

impl FormatVersion {
    /// Revision assigned to layouts that carry no version field on the wire.
    pub const IMPLICIT: FormatVersion = FormatVersion(0);
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Logical radio / subscription identifier on multi-SIM devices.
///
/// Passed through for downstream tagging only; it never selects decode behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadioId(pub u8);

impl fmt::Display for RadioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
