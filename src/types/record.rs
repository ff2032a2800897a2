//! Decoded record types
//!
//! One variant per opcode family. Records are produced fresh by every decode
//! call and own all of their data.

use serde::{Deserialize, Serialize};

use crate::convert::Plmn;

/// Structured output of a record decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Record {
    /// Nothing to report (fallbacks, or a record that signals "no cell")
    Empty,
    /// Known opcode without a field layout; payload forwarded verbatim
    Opaque(OpaqueRecord),
    EdgeServingCell(EdgeServingCell),
    EdgeNeighborCells(EdgeNeighborCells),
    Edge3gNeighborCells(Edge3gNeighborCells),
    EdgeMeasurement(EdgeMeasurement),
    NrMmState(NrMmState),
    NrRrcOta(NrRrcOta),
    NrServingCell(NrServingCell),
    NrRrcCarrier(NrRrcCarrier),
}

impl Record {
    /// Returns true for [`Record::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Record::Empty)
    }
}

/// Raw payload of a registered opcode whose layout is not yet mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueRecord {
    /// Name of the undecoded family
    pub label: String,
    pub payload: Vec<u8>,
}

/// GSM/EDGE serving cell identity and level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeServingCell {
    pub arfcn: u16,
    pub bsic: u8,
    pub rxlev: u8,
    pub rssi_dbm: i16,
    pub plmn: Plmn,
    pub lac: u16,
    pub rac: u8,
    pub cell_id: u16,
}

/// One GSM cell as seen by a measurement: channel, identity, level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsmCell {
    pub arfcn: u16,
    pub bsic: u8,
    pub rxlev: u8,
    pub rssi_dbm: i16,
}

/// Reselection candidate from the EDGE neighbor cell list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsmCandidate {
    pub arfcn: u16,
    /// `None` when the BSIC has not been decoded yet
    pub bsic: Option<u8>,
}

/// Per-channel received level from the EDGE neighbor cell list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsmLevel {
    pub arfcn: u16,
    pub rxlev: u8,
    pub rssi_dbm: i16,
}

/// EDGE neighbor cell information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeNeighborCells {
    pub candidates: Vec<GsmCandidate>,
    pub levels: Vec<GsmLevel>,
}

/// UMTS neighbor measured while camped on GSM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UmtsNeighbor {
    pub uarfcn: u16,
    pub psc: u16,
    pub rssi: u8,
    pub rscp_dbm: i16,
    pub ecno_db: f32,
}

/// EDGE 3G (UMTS) neighbor cell list, in payload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge3gNeighborCells {
    pub cells: Vec<UmtsNeighbor>,
}

/// EDGE measurement report: serving cell plus measured neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMeasurement {
    pub serving: GsmCell,
    pub txlev: u16,
    pub neighbors: Vec<GsmCell>,
}

/// NR 5G mobility management state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NrMmState {
    pub mm_state: u8,
    pub mm_substate: u8,
    pub mm_update_status: u8,
    pub plmn: Plmn,
    /// `None` when the modem reports an all-0xFF (unassigned) GUTI
    pub guti: Option<Vec<u8>>,
}

/// Channel of an NR RRC message, from the packet's PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NrRrcChannel {
    UlDcch,
    RrcReconfiguration,
    RrcReconfigurationComplete,
    RadioBearerConfig,
}

/// NR RRC over-the-air message with its radio context.
///
/// The message itself stays ASN.1 encoded; rendering it is the sink's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NrRrcOta {
    pub rrc_release: u16,
    pub rb_id: u8,
    pub pci: u16,
    pub nr_arfcn: u32,
    pub sfn_subfn: u32,
    pub channel: NrRrcChannel,
    pub message: Vec<u8>,
}

/// NR serving cell identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NrServingCell {
    pub pci: u16,
    pub nr_arfcn: u32,
}

/// NR carrier reported alongside RRC state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NrRrcCarrier {
    pub nr_arfcn: u32,
}
