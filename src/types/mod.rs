//! Core types for diagnostic packet decoding.
//!
//! ## Architecture
//!
//! - [`Opcode`] identifies a message family and is the dispatch key
//! - [`FormatVersion`] selects a layout inside one family
//! - [`RawPacket`] carries one framed payload with its capture context
//! - [`Record`] is the structured output of a family decoder
//! - [`Decoded`] wraps either a record or a fallback with the capture context
//!
//! ## Usage Example
//!
//! ```rust
//! use modemlog::types::{Opcode, RadioId, RawPacket};
//! use std::time::SystemTime;
//!
//! let packet = RawPacket::new(Opcode::sdm(0x03, 0x00), vec![0xff, 0xff], SystemTime::UNIX_EPOCH, RadioId(0));
//! assert_eq!(packet.opcode.to_string(), "0x0300");
//! ```

mod opcode;
mod packet;
mod record;

pub use opcode::{FormatVersion, Opcode, RadioId, SDM_GROUP_EDGE};
pub use packet::{DecodeOutcome, Decoded, RawPacket};
pub use record::{
    Edge3gNeighborCells, EdgeMeasurement, EdgeNeighborCells, EdgeServingCell, GsmCandidate,
    GsmCell, GsmLevel, NrMmState, NrRrcCarrier, NrRrcChannel, NrRrcOta, NrServingCell,
    OpaqueRecord, Record, UmtsNeighbor,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Plmn;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sdm_opcode_keeps_group_and_command(group in any::<u8>(), command in any::<u8>()) {
            let opcode = Opcode::sdm(group, command);
            prop_assert_eq!((opcode.value() >> 8) as u8, group);
            prop_assert_eq!((opcode.value() & 0xff) as u8, command);
            prop_assert!(opcode.value() <= 0xffff);
        }

        #[test]
        fn prop_opcode_display_round_trips_through_hex(raw in 0u32..0x1_0000) {
            let shown = Opcode(raw).to_string();
            prop_assert!(shown.starts_with("0x"));
            prop_assert_eq!(u32::from_str_radix(&shown[2..], 16).ok(), Some(raw));
        }
    }

    #[test]
    fn record_serializes_with_family_tag() {
        let record = Record::EdgeServingCell(EdgeServingCell {
            arfcn: 44,
            bsic: 0x3d,
            rxlev: 34,
            rssi_dbm: -76,
            plmn: Plmn { mcc: "262".to_string(), mnc: "02".to_string() },
            lac: 0x134,
            rac: 1,
            cell_id: 0x2e06,
        });

        let yaml = serde_yaml_ng::to_string(&record).unwrap();
        assert!(yaml.contains("family: edge_serving_cell"));
        assert!(yaml.contains("rssi_dbm: -76"));

        let back: Record = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn opaque_record_survives_yaml() {
        let record =
            Record::Opaque(OpaqueRecord { label: "NR stub".to_string(), payload: vec![1, 2, 3] });
        let yaml = serde_yaml_ng::to_string(&record).unwrap();
        assert!(yaml.contains("family: opaque"));

        let back: Record = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn empty_record_is_empty() {
        assert!(Record::Empty.is_empty());
        assert!(!Record::NrRrcCarrier(NrRrcCarrier { nr_arfcn: 1 }).is_empty());
    }
}
