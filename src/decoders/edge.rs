//! Samsung SDM EDGE (GSM/GPRS) record layouts
//!
//! SDM EDGE payloads carry no version field. Each family has one layout at
//! revision 0. Identifiers in the serving cell record (LAC, cell id) are
//! big-endian; everything else is little-endian.

use tracing::debug;

use super::{BodyShape, Family, Frame, VersionLayout};
use crate::convert::{Plmn, bsic6, ecno_db, narrow_u8, rscp_dbm, rssi_from_rxlev};
use crate::types::{
    Edge3gNeighborCells, EdgeMeasurement, EdgeNeighborCells, EdgeServingCell, FormatVersion,
    GsmCandidate, GsmCell, GsmLevel, Opcode, Record, SDM_GROUP_EDGE, UmtsNeighbor,
};
use crate::wire::{ByteCursor, FieldType, HeaderLayout, field, read_u16_le};
use crate::{DecodeError, Result};

pub const EDGE_SCELL_INFO: u8 = 0x00;
pub const EDGE_NCELL_INFO: u8 = 0x01;
pub const EDGE_3G_NCELL_INFO: u8 = 0x02;
pub const EDGE_HANDOVER_INFO: u8 = 0x03;
pub const EDGE_HANDOVER_HISTORY_INFO: u8 = 0x04;
pub const EDGE_MEAS_INFO: u8 = 0x05;

/// ARFCN value marking an unused cell slot.
const EMPTY_ARFCN: u16 = 0xffff;
/// BSIC byte meaning "not decoded yet".
const BSIC_UNKNOWN: u8 = 0xff;
/// Highest GSM RXLEV index.
const RXLEV_MAX: u8 = 63;

const CANDIDATE_STRIDE: usize = 18;
const LEVEL_STRIDE: usize = 3;
const UMTS_NEIGHBOR_STRIDE: usize = 7;
const MEAS_NEIGHBOR_STRIDE: usize = 10;

pub(super) fn catalogue() -> Vec<(Opcode, Family)> {
    vec![
        (Opcode::sdm(SDM_GROUP_EDGE, EDGE_SCELL_INFO), Family::EdgeServingCell),
        (Opcode::sdm(SDM_GROUP_EDGE, EDGE_NCELL_INFO), Family::EdgeNeighborCells),
        (Opcode::sdm(SDM_GROUP_EDGE, EDGE_3G_NCELL_INFO), Family::Edge3gNeighborCells),
        (
            Opcode::sdm(SDM_GROUP_EDGE, EDGE_HANDOVER_INFO),
            Family::QuietStub("EDGE handover info"),
        ),
        (
            Opcode::sdm(SDM_GROUP_EDGE, EDGE_HANDOVER_HISTORY_INFO),
            Family::QuietStub("EDGE handover history"),
        ),
        (Opcode::sdm(SDM_GROUP_EDGE, EDGE_MEAS_INFO), Family::EdgeMeasurement),
    ]
}

pub(super) const SERVING_CELL: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion::IMPLICIT,
    header: HeaderLayout {
        len: 15,
        fields: &[
            field("arfcn", 0, FieldType::U16Le),
            field("bsic", 2, FieldType::U8),
            field("rxlev", 3, FieldType::U8),
            field("plmn", 7, FieldType::Bytes(3)),
            field("lac", 10, FieldType::U16Be),
            field("rac", 12, FieldType::U8),
            field("cell_id", 13, FieldType::U16Be),
        ],
    },
    body: BodyShape::Free,
    assemble: assemble_serving_cell,
}];

pub(super) const NEIGHBOR_CELLS: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion::IMPLICIT,
    header: HeaderLayout { len: 1, fields: &[field("candidate_count", 0, FieldType::U8)] },
    body: BodyShape::Free,
    assemble: assemble_neighbor_cells,
}];

pub(super) const UMTS_NEIGHBOR_CELLS: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion::IMPLICIT,
    header: HeaderLayout { len: 1, fields: &[field("count", 0, FieldType::U8)] },
    body: BodyShape::Stride(UMTS_NEIGHBOR_STRIDE),
    assemble: assemble_umts_neighbors,
}];

pub(super) const MEASUREMENT: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion::IMPLICIT,
    header: HeaderLayout {
        len: 16,
        fields: &[
            field("arfcn", 0, FieldType::U16Le),
            field("bsic", 2, FieldType::U16Le),
            field("rxlev", 4, FieldType::U16Le),
            field("txlev", 14, FieldType::U16Le),
        ],
    },
    body: BodyShape::Stride(MEAS_NEIGHBOR_STRIDE),
    assemble: assemble_measurement,
}];

fn assemble_serving_cell(frame: &Frame<'_>) -> Result<Record> {
    let arfcn: u16 = frame.fields.get("arfcn")?;
    if arfcn == EMPTY_ARFCN {
        debug!(opcode = %frame.opcode, "No EDGE serving cell");
        return Ok(Record::Empty);
    }

    let rxlev: u8 = frame.fields.get("rxlev")?;
    Ok(Record::EdgeServingCell(EdgeServingCell {
        arfcn,
        bsic: bsic6(frame.fields.get::<u8>("bsic")? as u16),
        rxlev,
        rssi_dbm: rssi_from_rxlev(rxlev),
        plmn: Plmn::from_bcd(frame.fields.get("plmn")?),
        lac: frame.fields.get("lac")?,
        rac: frame.fields.get("rac")?,
        cell_id: frame.fields.get("cell_id")?,
    }))
}

fn assemble_neighbor_cells(frame: &Frame<'_>) -> Result<Record> {
    let candidate_count: u8 = frame.fields.get("candidate_count")?;
    let mut cursor = ByteCursor::new(frame.body);

    let mut candidates = Vec::with_capacity(candidate_count as usize);
    for _ in 0..candidate_count {
        let entry = cursor.take(CANDIDATE_STRIDE, "EDGE neighbor candidates")?;
        candidates.push(GsmCandidate {
            arfcn: le16(entry, 0)?,
            bsic: match entry[2] {
                BSIC_UNKNOWN => None,
                raw => Some(bsic6(raw as u16)),
            },
        });
    }

    let level_count = cursor.u8("EDGE neighbor level count")?;
    let mut levels = Vec::with_capacity(level_count as usize);
    for _ in 0..level_count {
        let entry = cursor.take(LEVEL_STRIDE, "EDGE neighbor levels")?;
        let rxlev = entry[2];
        levels.push(GsmLevel { arfcn: le16(entry, 0)?, rxlev, rssi_dbm: rssi_from_rxlev(rxlev) });
    }

    Ok(Record::EdgeNeighborCells(EdgeNeighborCells { candidates, levels }))
}

fn assemble_umts_neighbors(frame: &Frame<'_>) -> Result<Record> {
    let count = frame.fields.get::<u8>("count")? as usize;
    let slots = frame.entries("EDGE 3G neighbor slots")?;
    if count > slots.len() {
        return Err(DecodeError::malformed(
            "EDGE 3G neighbor count",
            count * UMTS_NEIGHBOR_STRIDE,
            frame.body.len(),
        ));
    }

    let cells = slots
        .take(count)
        .map(|entry| {
            Ok(UmtsNeighbor {
                uarfcn: le16(entry, 0)?,
                psc: le16(entry, 2)?,
                rssi: entry[4],
                rscp_dbm: rscp_dbm(entry[5]),
                ecno_db: ecno_db(entry[6]),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Record::Edge3gNeighborCells(Edge3gNeighborCells { cells }))
}

fn assemble_measurement(frame: &Frame<'_>) -> Result<Record> {
    let serving = gsm_cell(
        frame.fields.get("arfcn")?,
        frame.fields.get("bsic")?,
        frame.fields.get("rxlev")?,
    );

    let mut neighbors = Vec::new();
    for entry in frame.entries("EDGE measurement neighbors")? {
        let arfcn = le16(entry, 0)?;
        if arfcn == EMPTY_ARFCN {
            continue;
        }
        neighbors.push(gsm_cell(arfcn, le16(entry, 2)?, le16(entry, 4)?));
    }

    Ok(Record::EdgeMeasurement(EdgeMeasurement {
        serving,
        txlev: frame.fields.get("txlev")?,
        neighbors,
    }))
}

fn gsm_cell(arfcn: u16, raw_bsic: u16, raw_rxlev: u16) -> GsmCell {
    let rxlev = narrow_u8(raw_rxlev, RXLEV_MAX, "rxlev");
    GsmCell { arfcn, bsic: bsic6(raw_bsic), rxlev, rssi_dbm: rssi_from_rxlev(rxlev) }
}

fn le16(entry: &[u8], offset: usize) -> Result<u16> {
    read_u16_le(entry, offset)
        .ok_or_else(|| DecodeError::malformed("EDGE entry field", offset + 2, entry.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{captures, unhex};

    fn decode(family: Family, command: u8, hex: &str) -> Result<Record> {
        family.decode(Opcode::sdm(SDM_GROUP_EDGE, command), &unhex(hex))
    }

    #[test]
    fn serving_cell_captures() {
        let expected = [
            (captures::EDGE_SCELL_44, 44, 0x3d, 34, -76, "262", "02", 0x134, 0x1, 0x2e06),
            (captures::EDGE_SCELL_4, 4, 0x3f, 30, -80, "262", "02", 0x141, 0x1, 0x291b),
            (captures::EDGE_SCELL_53, 53, 0x14, 28, -82, "262", "01", 0x1407, 0x1, 0xbb44),
        ];

        for (hex, arfcn, bsic, rxlev, rssi, mcc, mnc, lac, rac, cell_id) in expected {
            match decode(Family::EdgeServingCell, EDGE_SCELL_INFO, hex).unwrap() {
                Record::EdgeServingCell(cell) => {
                    assert_eq!(cell.arfcn, arfcn);
                    assert_eq!(cell.bsic, bsic);
                    assert_eq!(cell.rxlev, rxlev);
                    assert_eq!(cell.rssi_dbm, rssi);
                    assert_eq!(cell.plmn.mcc, mcc);
                    assert_eq!(cell.plmn.mnc, mnc);
                    assert_eq!(cell.lac, lac);
                    assert_eq!(cell.rac, rac);
                    assert_eq!(cell.cell_id, cell_id);
                }
                other => panic!("Expected serving cell, got {:?}", other),
            }
        }
    }

    #[test]
    fn serving_cell_without_cell_is_empty() {
        let record = decode(Family::EdgeServingCell, EDGE_SCELL_INFO, captures::EDGE_SCELL_NONE);
        assert_eq!(record.unwrap(), Record::Empty);
    }

    #[test]
    fn serving_cell_short_payload_is_malformed() {
        let result = decode(Family::EdgeServingCell, EDGE_SCELL_INFO, "2c003d22000801");
        assert!(matches!(result, Err(DecodeError::MalformedLength { needed: 15, actual: 7, .. })));
    }

    #[test]
    fn umts_neighbors_with_zero_declared() {
        match decode(Family::Edge3gNeighborCells, EDGE_3G_NCELL_INFO, captures::EDGE_3G_NCELL_EMPTY)
            .unwrap()
        {
            Record::Edge3gNeighborCells(list) => assert!(list.cells.is_empty()),
            other => panic!("Expected 3G neighbor list, got {:?}", other),
        }
    }

    #[test]
    fn umts_neighbors_with_ten_cells() {
        let record =
            decode(Family::Edge3gNeighborCells, EDGE_3G_NCELL_INFO, captures::EDGE_3G_NCELL_10)
                .unwrap();
        let Record::Edge3gNeighborCells(list) = record else {
            panic!("Expected 3G neighbor list");
        };

        let pscs: Vec<u16> = list.cells.iter().map(|cell| cell.psc).collect();
        assert_eq!(pscs, vec![335, 37, 64, 103, 113, 195, 217, 239, 250, 261]);
        assert!(list.cells.iter().all(|cell| cell.uarfcn == 10836 && cell.rssi == 1));

        assert_eq!(list.cells[0].rscp_dbm, -90);
        assert_eq!(list.cells[0].ecno_db, -6.0);
        for cell in &list.cells[1..] {
            assert_eq!(cell.rscp_dbm, -107);
            assert_eq!(cell.ecno_db, -24.0);
        }
    }

    #[test]
    fn umts_count_beyond_slots_is_malformed() {
        // 2 declared, 1 slot present
        let result = decode(Family::Edge3gNeighborCells, EDGE_3G_NCELL_INFO, "02542a4f01015a3c");
        assert!(matches!(result, Err(DecodeError::MalformedLength { .. })));
    }

    #[test]
    fn measurement_captures() {
        let cases = [
            (captures::EDGE_MEAS_8, (68, 0x32, 17, -93), 0, vec![(58, 0x2d, 2, -108), (52, 0x20, 9, -101), (63, 0x3f, 1, -109), (11, 0x3f, 1, -109), (78, 0x3f, 8, -102), (69, 0x3f, 2, -108), (67, 0x3f, 1, -109), (77, 0x3a, 1, -109)]),
            (captures::EDGE_MEAS_7, (53, 0x14, 33, -77), 0, vec![(59, 0x18, 26, -84), (75, 0x3f, 19, -91), (57, 0x3f, 20, -90), (62, 0x3f, 12, -98), (51, 0x3f, 14, -96), (66, 0x3f, 14, -96), (53, 0x14, 34, -76)]),
            (captures::EDGE_MEAS_6, (53, 0x14, 30, -80), 33, vec![(59, 0x18, 18, -92), (57, 0x04, 10, -100), (75, 0x3f, 17, -93), (73, 0x3f, 13, -97), (62, 0x05, 13, -97), (66, 0x0b, 10, -100)]),
        ];

        for (hex, serving, txlev, neighbors) in cases {
            let Record::EdgeMeasurement(meas) =
                decode(Family::EdgeMeasurement, EDGE_MEAS_INFO, hex).unwrap()
            else {
                panic!("Expected measurement record");
            };

            let cell = |c: &GsmCell| (c.arfcn, c.bsic, c.rxlev, c.rssi_dbm);
            assert_eq!(cell(&meas.serving), serving);
            assert_eq!(meas.txlev, txlev);
            assert_eq!(meas.neighbors.iter().map(cell).collect::<Vec<_>>(), neighbors);
        }
    }

    #[test]
    fn measurement_with_ragged_body_is_malformed() {
        let mut hex = captures::EDGE_MEAS_8.to_string();
        hex.push_str("0102");
        let result = decode(Family::EdgeMeasurement, EDGE_MEAS_INFO, &hex);
        assert!(matches!(result, Err(DecodeError::StrideMismatch { stride: 10, len: 92, .. })));
    }

    #[test]
    fn neighbor_cells_capture() {
        let Record::EdgeNeighborCells(cells) =
            decode(Family::EdgeNeighborCells, EDGE_NCELL_INFO, captures::EDGE_NCELL).unwrap()
        else {
            panic!("Expected neighbor cell record");
        };

        let candidates: Vec<u16> = cells.candidates.iter().map(|c| c.arfcn).collect();
        assert_eq!(candidates, vec![115, 118, 84, 82, 65, 75]);
        assert!(cells.candidates.iter().all(|c| c.bsic.is_none()));

        let levels: Vec<(u16, u8)> = cells.levels.iter().map(|l| (l.arfcn, l.rxlev)).collect();
        assert_eq!(
            levels,
            vec![(115, 41), (84, 34), (82, 31), (75, 30), (58, 29), (118, 29), (65, 28), (67, 24), (56, 24), (53, 22)]
        );
        assert_eq!(cells.levels[0].rssi_dbm, -69);
    }

    #[test]
    fn neighbor_cells_overrunning_count_is_malformed() {
        // one candidate declared, only 4 entry bytes present
        let result = decode(Family::EdgeNeighborCells, EDGE_NCELL_INFO, "017300ff35");
        assert!(matches!(result, Err(DecodeError::MalformedLength { .. })));
    }

    #[test]
    fn handover_records_are_opaque() {
        for command in [EDGE_HANDOVER_INFO, EDGE_HANDOVER_HISTORY_INFO] {
            let (_, family) = catalogue()
                .into_iter()
                .find(|(opcode, _)| *opcode == Opcode::sdm(SDM_GROUP_EDGE, command))
                .unwrap();
            let record = decode(family, command, captures::EDGE_HANDOVER_HISTORY).unwrap();
            assert!(matches!(record, Record::Opaque(_)));
        }
    }
}
