//! Conversion primitives from raw wire fields to domain units.
//!
//! All functions here are pure and total. Inputs wider than their target
//! unit follow one overflow policy: saturate (or mask, for identity codes)
//! and emit a `warn!`, never wrap into a value of a different sign.
//!
//! [`half_db`] and [`SignalScale::Lte`] have no caller among the built-in
//! families. They are public for callers converting half-step ratio fields
//! and LTE RSRP indices from opaque stub payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// BCD nibble meaning "digit absent".
pub const BCD_FILLER: u8 = 0x0f;

/// Affine signal-level scales: `dBm = index - offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalScale {
    /// GSM RXLEV (3GPP TS 45.008), indices 0..=63
    Gsm,
    /// LTE RSRP reporting range (3GPP TS 36.133), indices 0..=97
    Lte,
}

impl SignalScale {
    /// Constant subtracted from the raw index.
    pub const fn offset(&self) -> i16 {
        match self {
            SignalScale::Gsm => 110,
            SignalScale::Lte => 140,
        }
    }

    /// Highest index defined by the reporting range.
    pub const fn max_index(&self) -> u16 {
        match self {
            SignalScale::Gsm => 63,
            SignalScale::Lte => 97,
        }
    }

    /// Convert a raw level index to dBm.
    pub fn to_dbm(&self, raw: u16) -> i16 {
        let index = if raw > self.max_index() {
            warn!(raw, max = self.max_index(), scale = ?self, "Signal index out of range, saturating");
            self.max_index()
        } else {
            raw
        };
        index as i16 - self.offset()
    }
}

/// GSM received level in dBm from an RXLEV index.
pub fn rssi_from_rxlev(rxlev: u8) -> i16 {
    SignalScale::Gsm.to_dbm(rxlev as u16)
}

/// Half-step decibel value of a signed raw ratio field.
pub fn half_db(raw: i8) -> f32 {
    raw as f32 * 0.5
}

/// UMTS Ec/No in dB from a field carrying tenths of a dB of attenuation.
pub fn ecno_db(raw: u8) -> f32 {
    -(raw as f32) / 10.0
}

/// UMTS RSCP in dBm from a field carrying its magnitude.
pub fn rscp_dbm(raw: u8) -> i16 {
    -(raw as i16)
}

/// Narrow a wider field into a `u8` bounded by `max`, saturating with a warning.
pub fn narrow_u8(value: u16, max: u8, field: &'static str) -> u8 {
    if value > max as u16 {
        warn!(field, value, max, "Field wider than its unit, saturating");
        max
    } else {
        value as u8
    }
}

/// GSM base station identity code (6 bits).
///
/// `0xFF` is the modem's "not decoded" sentinel and maps to `0x3F` silently;
/// other out-of-range values are masked with a warning.
pub fn bsic6(raw: u16) -> u8 {
    if raw > 0x3f && raw != 0xff {
        warn!(raw, "BSIC wider than 6 bits, masking");
    }
    (raw & 0x3f) as u8
}

/// Decode packed BCD digits, low nibble first.
///
/// Filler nibbles are omitted. Other non-decimal nibbles are omitted too,
/// with a warning.
pub fn bcd_digits(bytes: &[u8]) -> String {
    nibble_digits(bytes.iter().flat_map(|&byte| [byte & 0x0f, byte >> 4]))
}

/// Render BCD nibbles given in reading order.
fn nibble_digits(nibbles: impl IntoIterator<Item = u8>) -> String {
    nibbles
        .into_iter()
        .filter_map(|nibble| match nibble {
            0..=9 => Some(char::from(b'0' + nibble)),
            BCD_FILLER => None,
            other => {
                warn!(nibble = other, "Non-decimal BCD nibble dropped");
                None
            }
        })
        .collect()
}

/// Public land mobile network identity (MCC + MNC).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plmn {
    pub mcc: String,
    pub mnc: String,
}

impl Plmn {
    /// Decode the 3-byte BCD PLMN of 3GPP TS 24.008 §10.5.1.3.
    ///
    /// Byte layout: `MCC2|MCC1`, `MNC3|MCC3`, `MNC2|MNC1`; a filler MNC3
    /// yields a two-digit MNC.
    pub fn from_bcd(bytes: [u8; 3]) -> Self {
        let mcc = nibble_digits([bytes[0] & 0x0f, bytes[0] >> 4, bytes[1] & 0x0f]);
        let mnc = nibble_digits([bytes[2] & 0x0f, bytes[2] >> 4, bytes[1] >> 4]);
        Self { mcc, mnc }
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mcc, self.mnc)
    }
}
