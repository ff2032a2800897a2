//! Qualcomm DIAG NR5G log code layouts
//!
//! Every NR payload starts with a little-endian u32 format version. Layouts
//! are keyed by that value; the header offsets below include the prefix.

use tracing::debug;

use super::{BodyShape, Family, Frame, VersionLayout};
use crate::convert::Plmn;
use crate::types::{
    FormatVersion, NrMmState, NrRrcCarrier, NrRrcChannel, NrRrcOta, NrServingCell, Opcode, Record,
};
use crate::wire::{FieldType, HeaderLayout, field};
use crate::{DecodeError, Result};

pub const LOG_NR_MM5G_STATE: u32 = 0xB80C;
pub const LOG_NR_RRC_OTA: u32 = 0xB821;
pub const LOG_NR_RRC_SERVING_CELL: u32 = 0xB822;
pub const LOG_NR_RRC_CARRIER: u32 = 0xB824;
pub const LOG_NR_RRC_SUPPORTED_CA_COMBOS: u32 = 0xB826;

/// Known NR log codes that are forwarded without a field layout.
pub const NR_STUB_CODES: &[u32] = &[
    0xB825, 0xB840, 0xB841, 0xB842, 0xB843, 0xB84B, 0xB84D, 0xB84E, 0xB856, 0xB857, 0xB860,
    0xB861, 0xB862, 0xB868, 0xB869, 0xB870, 0xB871, 0xB872, 0xB873, 0xB881, 0xB882, 0xB883,
    0xB885, 0xB886, 0xB887, 0xB888, 0xB889, 0xB88A, 0xB88B, 0xB88C, 0xB88D, 0xB88F, 0xB890,
    0xB896, 0xB897, 0xB89B, 0xB89C, 0xB89D, 0xB89E, 0xB8A1, 0xB8A3, 0xB8A4, 0xB8A6, 0xB8A7,
    0xB8A8, 0xB8C0, 0xB8C4, 0xB8C5, 0xB8C6, 0xB8C7, 0xB8C8, 0xB8C9, 0xB8CA, 0xB8CB, 0xB8CD,
    0xB8CE, 0xB8D1, 0xB8D2, 0xB8D3, 0xB8DD, 0xB8DE, 0xB8E0, 0xB8E2, 0xB951, 0xB952, 0xB954,
    0xB955, 0xB956, 0xB958, 0xB959, 0xB95B, 0xB95C, 0xB95D, 0xB960, 0xB969, 0xB96A, 0xB96B,
    0xB96C, 0xB96E, 0xB96F, 0xB974, 0xB977, 0xB979, 0xB97C, 0xB97F, 0xB980, 0xB982, 0xB983,
    0xB986, 0xB987, 0xB989, 0xB98A, 0xB98F, 0xB9A3,
];

/// RRC PDU type tags and the channel they carry.
pub const RRC_PDU_TYPES: &[(u8, NrRrcChannel)] = &[
    (8, NrRrcChannel::UlDcch),
    (9, NrRrcChannel::RrcReconfiguration),
    (10, NrRrcChannel::RrcReconfigurationComplete),
    (25, NrRrcChannel::RadioBearerConfig),
];

const GUTI_LEN: usize = 12;

pub(super) fn catalogue() -> Vec<(Opcode, Family)> {
    let mut entries = vec![
        (Opcode(LOG_NR_MM5G_STATE), Family::NrMmState),
        (Opcode(LOG_NR_RRC_OTA), Family::NrRrcOta),
        (Opcode(LOG_NR_RRC_SERVING_CELL), Family::NrServingCell),
        (Opcode(LOG_NR_RRC_CARRIER), Family::NrRrcCarrier),
        (Opcode(LOG_NR_RRC_SUPPORTED_CA_COMBOS), Family::Stub("NR supported CA combos")),
    ];
    entries.extend(NR_STUB_CODES.iter().map(|&code| (Opcode(code), Family::Stub("NR stub"))));
    entries
}

pub(super) const MM_STATE: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion(1),
    header: HeaderLayout {
        len: 22,
        fields: &[
            field("version", 0, FieldType::U32Le),
            field("mm_state", 4, FieldType::U8),
            field("mm_substate", 5, FieldType::U8),
            field("mm_update_status", 6, FieldType::U8),
            field("plmn", 7, FieldType::Bytes(3)),
            field("guti", 10, FieldType::Bytes(GUTI_LEN)),
        ],
    },
    body: BodyShape::Free,
    assemble: assemble_mm_state,
}];

pub(super) const RRC_OTA: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion(9),
    header: HeaderLayout {
        len: 24,
        fields: &[
            field("version", 0, FieldType::U32Le),
            field("rrc_release", 4, FieldType::U16Le),
            field("rb_id", 6, FieldType::U8),
            field("pci", 7, FieldType::U16Le),
            field("nr_arfcn", 9, FieldType::U32Le),
            field("sfn_subfn", 13, FieldType::U32Le),
            field("pdu_type", 17, FieldType::U8),
            field("msg_len", 22, FieldType::U16Le),
        ],
    },
    body: BodyShape::Free,
    assemble: assemble_rrc_ota,
}];

pub(super) const SERVING_CELL: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion(3),
    header: HeaderLayout {
        len: 14,
        fields: &[
            field("version", 0, FieldType::U32Le),
            field("pci", 4, FieldType::U16Le),
            field("nr_arfcn", 6, FieldType::U32Le),
        ],
    },
    body: BodyShape::Free,
    assemble: assemble_serving_cell,
}];

pub(super) const RRC_CARRIER: &[VersionLayout] = &[VersionLayout {
    version: FormatVersion(5),
    header: HeaderLayout {
        len: 13,
        fields: &[field("version", 0, FieldType::U32Le), field("nr_arfcn", 7, FieldType::U32Le)],
    },
    body: BodyShape::Free,
    assemble: assemble_rrc_carrier,
}];

/// Channel for an RRC PDU type tag.
pub fn rrc_channel(pdu_type: u8) -> Option<NrRrcChannel> {
    RRC_PDU_TYPES.iter().find(|(tag, _)| *tag == pdu_type).map(|(_, channel)| *channel)
}

fn assemble_mm_state(frame: &Frame<'_>) -> Result<Record> {
    let guti: &[u8] = frame.fields.get("guti")?;
    let guti = if guti.iter().all(|&b| b == 0xff) { None } else { Some(guti.to_vec()) };

    Ok(Record::NrMmState(NrMmState {
        mm_state: frame.fields.get("mm_state")?,
        mm_substate: frame.fields.get("mm_substate")?,
        mm_update_status: frame.fields.get("mm_update_status")?,
        plmn: Plmn::from_bcd(frame.fields.get("plmn")?),
        guti,
    }))
}

fn assemble_rrc_ota(frame: &Frame<'_>) -> Result<Record> {
    let msg_len = frame.fields.get::<u16>("msg_len")? as usize;
    let message = frame
        .body
        .get(..msg_len)
        .ok_or_else(|| DecodeError::malformed("NR RRC message", msg_len, frame.body.len()))?;

    let pdu_type: u8 = frame.fields.get("pdu_type")?;
    let channel = rrc_channel(pdu_type).ok_or_else(|| DecodeError::UnrecognizedInnerType {
        opcode: frame.opcode,
        inner_type: pdu_type as u32,
        inner: message.to_vec(),
    })?;
    debug!(opcode = %frame.opcode, ?channel, msg_len, "NR RRC message");

    Ok(Record::NrRrcOta(NrRrcOta {
        rrc_release: frame.fields.get("rrc_release")?,
        rb_id: frame.fields.get("rb_id")?,
        pci: frame.fields.get("pci")?,
        nr_arfcn: frame.fields.get("nr_arfcn")?,
        sfn_subfn: frame.fields.get("sfn_subfn")?,
        channel,
        message: message.to_vec(),
    }))
}

fn assemble_serving_cell(frame: &Frame<'_>) -> Result<Record> {
    Ok(Record::NrServingCell(NrServingCell {
        pci: frame.fields.get("pci")?,
        nr_arfcn: frame.fields.get("nr_arfcn")?,
    }))
}

fn assemble_rrc_carrier(frame: &Frame<'_>) -> Result<Record> {
    Ok(Record::NrRrcCarrier(NrRrcCarrier { nr_arfcn: frame.fields.get("nr_arfcn")? }))
}
