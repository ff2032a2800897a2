//! Test utilities: regression captures and payload builders
//!
//! This file has no dependency on the rest of the crate so integration tests
//! and benches can include it directly with `#[path]`.

#![cfg(any(test, feature = "benchmark"))]

/// Error returned when a hex fixture cannot be decoded.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl FixtureError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// Decode a contiguous hex string (whitespace allowed) into bytes.
pub fn try_unhex(hex: &str) -> Result<Vec<u8>, FixtureError> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(FixtureError::new(format!("Odd number of hex digits: {}", digits.len())));
    }

    digits
        .chunks_exact(2)
        .map(|pair| {
            let text = std::str::from_utf8(pair)
                .map_err(|_| FixtureError::new("Hex fixture is not ASCII"))?;
            u8::from_str_radix(text, 16)
                .map_err(|_| FixtureError::new(format!("Invalid hex byte '{}'", text)))
        })
        .collect()
}

/// Decode a hex fixture, panicking on malformed input.
pub fn unhex(hex: &str) -> Vec<u8> {
    try_unhex(hex).unwrap_or_else(|e| panic!("Bad hex fixture: {}", e))
}

/// Little-endian payload builder for synthetic packets.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    bytes: Vec<u8>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a payload with a u32 format version prefix.
    pub fn versioned(version: u32) -> Self {
        Self::new().u32(version)
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.bytes.extend_from_slice(value);
        self
    }

    /// Append `count` copies of `byte`.
    pub fn fill(mut self, byte: u8, count: usize) -> Self {
        self.bytes.resize(self.bytes.len() + count, byte);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Payloads captured from real modems, as hex.
pub mod captures {
    /// EDGE serving cell reporting no cell (arfcn 0xFFFF)
    pub const EDGE_SCELL_NONE: &str =
        "ffff00000000000000000000000000000000000000000000000000000000000000000000ffff";
    /// EDGE serving cell, ARFCN 44, PLMN 262/02
    pub const EDGE_SCELL_44: &str =
        "2c003d2200080162f2200134012e060001000101000000000000000021011c1cffffffffc202";
    /// EDGE serving cell, ARFCN 4, PLMN 262/02
    pub const EDGE_SCELL_4: &str =
        "04003f1e00060162f220014101291b0001000101000000000000000021021a1affffffffc202";
    /// EDGE serving cell, ARFCN 53, PLMN 262/01
    pub const EDGE_SCELL_53: &str =
        "3500141c00060062f210140701bb4400010001000000000000000000210018f9ffffffffd601";

    /// EDGE 3G neighbor list declaring no cells (slots hold stale bytes)
    pub const EDGE_3G_NCELL_EMPTY: &str = "00000000a843c745989153645c99d5420f0000000200000054b6c5455003c84279181642000000002c003d2200080162f2200134989153647d02000000000000420000004838e4";
    /// EDGE 3G neighbor list with 10 cells on UARFCN 10836
    pub const EDGE_3G_NCELL_10: &str = "0a542a4f01015a3c542a2500016bf0542a4000016bf0542a6700016bf0542a7100016bf0542ac300016bf0542ad900016bf0542aef00016bf0542afa00016bf0542a0501016bf0";

    /// EDGE measurement info, serving ARFCN 68, 8 neighbors
    pub const EDGE_MEAS_8: &str = "4400320011000f0000000f00000000003a002d00020021000000340020000900000000003f00ff000100925302000b00ff0001007e4329004e00ff000800010000004500ff0002007c0027004300ff0001006f1c27004d003a000100551f0000ffffff001d00d3470d00";
    /// EDGE measurement info, serving ARFCN 53, 7 neighbors
    pub const EDGE_MEAS_7: &str = "350014002100000000000000000000003b0018001a00756407004b00ff001300756407003900ff001400000000003e00ff000c00571108003300ff000e00756407004200ff000e000100000035001400220075640700ffffff00000000000000ffffff00000000000000";
    /// EDGE measurement info, serving ARFCN 53, txlev 33, 6 neighbors
    pub const EDGE_MEAS_6: &str = "350014001e00000000000000000021003b001800120000000000390004000a00e3ac00004b00ff00110047a100004900ff000d0047a100003e0005000d002c57260042000b000a00bd0b1000ffffff00000000000000ffffff00000000000000ffffff00000000000000";

    /// EDGE neighbor cells: 6 candidates, 10 level entries, trailing data
    pub const EDGE_NCELL: &str = "067300ff35f9f9ffffffff00000000000000ff7600ff28f9f9ffffffff00000000000000ff5400ff26f9f9ffffffff00000000000000ff5200ff23f9f9ffffffff00000000000000ff4100ff1cf9f9ffffffff00000000000000ff4b00ff1df9f9ffffffff00000000000000ff0a73002954002252001f4b001e3a001d76001d41001c430018380018350016000000005ce79b417c061d43fd061d4311071d4300068114620000002875e44600204000020001000000000020282543060100001e0000007c426a413b5936417c426a417c000f1200060062f210140601418d0001000100000200";

    /// EDGE handover info, all zero
    pub const EDGE_HANDOVER_ZERO: &str = "000000000000000000000000000000000000000000000000";
    /// EDGE handover info
    pub const EDGE_HANDOVER: &str = "000000000000000001000000000000000000000000000000";
    /// EDGE handover history
    pub const EDGE_HANDOVER_HISTORY: &str = "ffffffff44291501";

    /// NR RRC OTA v9, UL-DCCH, PCI 710, NR-ARFCN 371904
    pub const NR_RRC_OTA_V9: &str = "090000000f9001c602c0ac0500000000000800000000090000010106c65cfbd640";
    /// NR serving cell v3, PCI 336
    pub const NR_SCELL_V3: &str = "030000005001c0ac05009a00003f";
    /// NR RRC carrier v5
    pub const NR_CARRIER_V5: &str = "0500000001010cc0ac05000000";
    /// NR MM5G state v1, PLMN 262/02, no GUTI
    pub const NR_MM_STATE_V1: &str = "0100000001020062f220ffffffffffffffffffffffff01000000";
}
