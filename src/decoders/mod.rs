//! Record decoders, one tagged variant per opcode family.
//!
//! Each family owns a table of supported format versions. A version entry is
//! pure data (header layout, body shape) plus the assembly routine that turns
//! the typed header and body into a [`Record`]. Adding a version means adding
//! a row, not editing control flow.
//!
//! ## Decode Pipeline
//!
//! Every invocation walks the same states and keeps nothing afterwards:
//!
//! 1. **HeaderPending** - read the format version (too short: malformed)
//! 2. **VersionChecked** - find the version row (missing: unknown version)
//! 3. **BodyParsed** - apply the header layout, check the body stride
//!    (mismatch: malformed)
//! 4. **Assembled** - run the assembly routine (unmatched inner tag:
//!    unrecognized inner type)
//!
//! ## Vendors
//!
//! - [`edge`]: Samsung SDM EDGE data, unversioned layouts (revision 0)
//! - [`nr`]: Qualcomm DIAG NR5G log codes, u32 version prefix

pub mod edge;
pub mod nr;

use tracing::trace;

use crate::types::{FormatVersion, Opcode, Record};
use crate::wire::{self, HeaderFields, HeaderLayout};
use crate::{DecodeError, Result};

/// Where a family finds its format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Versioning {
    /// Little-endian u32 at offset 0
    PrefixU32Le,
    /// No version on the wire; the single layout is [`FormatVersion::IMPLICIT`]
    Implicit,
}

impl Versioning {
    /// Size of the version prefix.
    pub const fn prefix_len(&self) -> usize {
        match self {
            Versioning::PrefixU32Le => 4,
            Versioning::Implicit => 0,
        }
    }

    /// Read the format version, rejecting payloads shorter than the prefix.
    pub fn read(&self, payload: &[u8], context: &str) -> Result<FormatVersion> {
        match self {
            Versioning::PrefixU32Le => wire::read_u32_le(payload, 0)
                .map(FormatVersion)
                .ok_or_else(|| DecodeError::malformed(format!("{} version", context), 4, payload.len())),
            Versioning::Implicit => Ok(FormatVersion::IMPLICIT),
        }
    }
}

/// Shape of the bytes after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// Interpreted by the assembly routine
    Free,
    /// Whole number of fixed-stride entries
    Stride(usize),
}

/// Everything an assembly routine may look at.
#[derive(Debug)]
pub struct Frame<'a> {
    pub opcode: Opcode,
    pub version: FormatVersion,
    pub fields: HeaderFields<'a>,
    pub body: &'a [u8],
    pub shape: BodyShape,
}

impl<'a> Frame<'a> {
    /// Fixed-stride entries of the body, in payload order.
    pub fn entries(&self, context: &str) -> Result<std::slice::ChunksExact<'a, u8>> {
        match self.shape {
            BodyShape::Stride(stride) => wire::entries(self.body, stride, context),
            BodyShape::Free => Err(DecodeError::layout(context, "body has no entry stride")),
        }
    }
}

/// Assembly routine of one version layout.
pub type Assemble = fn(&Frame<'_>) -> Result<Record>;

/// One supported format version of a family.
#[derive(Debug, Clone, Copy)]
pub struct VersionLayout {
    pub version: FormatVersion,
    pub header: HeaderLayout,
    pub body: BodyShape,
    pub assemble: Assemble,
}

/// Decoder family, one per supported opcode group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    EdgeServingCell,
    EdgeNeighborCells,
    Edge3gNeighborCells,
    EdgeMeasurement,
    NrMmState,
    NrRrcOta,
    NrServingCell,
    NrRrcCarrier,
    /// Known opcode without a field layout; payload is forwarded as-is
    Stub(&'static str),
    /// Like [`Family::Stub`], for routine packets traced only at debug
    QuietStub(&'static str),
}

impl Family {
    /// Human-readable family name.
    pub const fn name(&self) -> &'static str {
        match self {
            Family::EdgeServingCell => "EDGE serving cell",
            Family::EdgeNeighborCells => "EDGE neighbor cells",
            Family::Edge3gNeighborCells => "EDGE 3G neighbor cells",
            Family::EdgeMeasurement => "EDGE measurement info",
            Family::NrMmState => "NR MM5G state",
            Family::NrRrcOta => "NR RRC OTA",
            Family::NrServingCell => "NR serving cell",
            Family::NrRrcCarrier => "NR RRC carrier",
            Family::Stub(label) | Family::QuietStub(label) => *label,
        }
    }

    /// How the family carries its format version.
    pub const fn versioning(&self) -> Versioning {
        match self {
            Family::EdgeServingCell
            | Family::EdgeNeighborCells
            | Family::Edge3gNeighborCells
            | Family::EdgeMeasurement
            | Family::Stub(_)
            | Family::QuietStub(_) => Versioning::Implicit,
            Family::NrMmState | Family::NrRrcOta | Family::NrServingCell | Family::NrRrcCarrier => {
                Versioning::PrefixU32Le
            }
        }
    }

    /// Supported version rows.
    pub fn layouts(&self) -> &'static [VersionLayout] {
        match self {
            Family::EdgeServingCell => edge::SERVING_CELL,
            Family::EdgeNeighborCells => edge::NEIGHBOR_CELLS,
            Family::Edge3gNeighborCells => edge::UMTS_NEIGHBOR_CELLS,
            Family::EdgeMeasurement => edge::MEASUREMENT,
            Family::NrMmState => nr::MM_STATE,
            Family::NrRrcOta => nr::RRC_OTA,
            Family::NrServingCell => nr::SERVING_CELL,
            Family::NrRrcCarrier => nr::RRC_CARRIER,
            Family::Stub(_) | Family::QuietStub(_) => &[],
        }
    }

    /// Versions this family can decode.
    pub fn supported_versions(&self) -> Vec<FormatVersion> {
        self.layouts().iter().map(|layout| layout.version).collect()
    }

    /// Returns true for families without a field layout.
    pub const fn is_stub(&self) -> bool {
        matches!(self, Family::Stub(_) | Family::QuietStub(_))
    }

    /// Returns true for stubs whose packets deserve a warning.
    pub const fn is_noisy_stub(&self) -> bool {
        matches!(self, Family::Stub(_))
    }

    /// Read the version carried on the wire without decoding anything else.
    ///
    /// Families with [`Versioning::Implicit`] carry none and yield `None`.
    pub fn peek_version(&self, payload: &[u8]) -> Option<FormatVersion> {
        match self.versioning() {
            Versioning::Implicit => None,
            versioning => versioning.read(payload, self.name()).ok(),
        }
    }

    /// Decode one payload.
    pub fn decode(&self, opcode: Opcode, payload: &[u8]) -> Result<Record> {
        if let Family::Stub(label) | Family::QuietStub(label) = self {
            return Ok(Record::Opaque(crate::types::OpaqueRecord {
                label: label.to_string(),
                payload: payload.to_vec(),
            }));
        }

        let context = self.name();
        let version = self.versioning().read(payload, context)?;
        let layout = self
            .layouts()
            .iter()
            .find(|layout| layout.version == version)
            .ok_or(DecodeError::UnknownVersion { opcode, version })?;

        let (fields, body) = layout.header.parse(payload, context)?;
        if let BodyShape::Stride(stride) = layout.body {
            wire::entries(body, stride, context)?;
        }
        trace!(opcode = %opcode, family = context, version = version.0, body_len = body.len(), "Body parsed");

        let frame = Frame { opcode, version, fields, body, shape: layout.body };
        (layout.assemble)(&frame)
    }
}

/// Every registered opcode with its family.
pub fn catalogue() -> Vec<(Opcode, Family)> {
    let mut entries = edge::catalogue();
    entries.extend(nr::catalogue());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_layout_is_self_consistent() {
        for (opcode, family) in catalogue() {
            for layout in family.layouts() {
                layout
                    .header
                    .validate()
                    .unwrap_or_else(|e| panic!("{} v{}: {}", opcode, layout.version, e));
                assert!(layout.header.len >= family.versioning().prefix_len());
                if let BodyShape::Stride(stride) = layout.body {
                    assert!(stride > 0);
                }
            }
        }
    }

    #[test]
    fn versions_unique_within_family() {
        for (_, family) in catalogue() {
            let versions = family.supported_versions();
            let unique: HashSet<_> = versions.iter().collect();
            assert_eq!(unique.len(), versions.len(), "{}", family.name());
        }
    }

    #[test]
    fn opcodes_registered_once() {
        let entries = catalogue();
        let unique: HashSet<_> = entries.iter().map(|(opcode, _)| *opcode).collect();
        assert_eq!(unique.len(), entries.len());
    }

    #[test]
    fn decoded_families_have_layouts_and_stubs_do_not() {
        for (_, family) in catalogue() {
            assert_eq!(family.is_stub(), family.layouts().is_empty(), "{}", family.name());
        }
    }

    #[test]
    fn prefix_version_needs_four_bytes() {
        let result = Family::NrServingCell.decode(Opcode(0xB822), &[3, 0, 0]);
        assert!(matches!(result, Err(DecodeError::MalformedLength { needed: 4, actual: 3, .. })));
        assert_eq!(Family::NrServingCell.peek_version(&[3, 0, 0]), None);
        assert_eq!(Family::NrServingCell.peek_version(&[3, 0, 0, 0]), Some(FormatVersion(3)));
    }

    #[test]
    fn implicit_versions_are_never_peeked() {
        assert_eq!(Family::EdgeMeasurement.peek_version(&[0x44, 0x00, 0x32]), None);
        assert_eq!(Family::EdgeServingCell.peek_version(&[0xff; 40]), None);
        assert_eq!(Family::QuietStub("EDGE handover info").peek_version(&[0; 24]), None);
    }

    #[test]
    fn quiet_stubs_are_stubs_but_not_noisy() {
        let quiet = Family::QuietStub("EDGE handover history");
        assert!(quiet.is_stub());
        assert!(!quiet.is_noisy_stub());
        assert!(Family::Stub("NR stub").is_noisy_stub());
        assert!(!Family::NrRrcOta.is_noisy_stub());
        assert!(matches!(
            quiet.decode(Opcode(0x0304), &[0xff, 0x44]),
            Ok(Record::Opaque(opaque)) if opaque.label == "EDGE handover history"
        ));
    }

    #[test]
    fn stub_forwards_payload() {
        let record = Family::Stub("NR stub").decode(Opcode(0xB840), &[1, 2, 3]).unwrap();
        match record {
            Record::Opaque(opaque) => {
                assert_eq!(opaque.label, "NR stub");
                assert_eq!(opaque.payload, vec![1, 2, 3]);
            }
            other => panic!("Expected opaque record, got {:?}", other),
        }
    }
}
