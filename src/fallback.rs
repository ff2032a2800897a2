//! Canonical handling of packets that cannot be decoded
//!
//! The fallback path always succeeds. It emits a trace naming the opcode and
//! the reason, renders a bounded hex dump for offline diagnosis, and hands the
//! caller a result that sinks can treat like an empty record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::DecodeError;
use crate::types::{FormatVersion, Opcode};

/// Default number of payload bytes rendered into a fallback hex dump.
pub const DEFAULT_HEXDUMP_LIMIT: usize = 64;

/// Why a packet took the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackReason {
    /// No decoder family registered for the opcode
    UnknownOpcode,
    /// Family registered, but no layout for the embedded version
    UnknownVersion,
    /// Payload too short, declared length overrun, or stride mismatch
    MalformedLength,
    /// Nested message tag missing from the family's inner table
    UnrecognizedInnerType,
}

impl FallbackReason {
    /// Stable tag used in traces and serialized output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::UnknownOpcode => "unknown-opcode",
            FallbackReason::UnknownVersion => "unknown-version",
            FallbackReason::MalformedLength => "malformed-length",
            FallbackReason::UnrecognizedInnerType => "unrecognized-inner-type",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackResult {
    pub opcode: Opcode,
    pub reason: FallbackReason,
    /// Embedded version, when the packet got far enough to carry one
    pub version: Option<FormatVersion>,
    /// Nested message tag, for `unrecognized-inner-type`
    pub inner_type: Option<u32>,
    /// Human-readable cause
    pub detail: String,
    /// Bounded hex rendering of `raw`
    pub hexdump: String,
    /// The relevant bytes: the whole payload, or the inner message
    pub raw: Vec<u8>,
}

/// Route a packet to the fallback path.
///
/// `reason` picks the trace level and tag; `hexdump_limit` bounds the dump.
pub fn handle(
    opcode: Opcode,
    payload: &[u8],
    reason: FallbackReason,
    hexdump_limit: usize,
) -> FallbackResult {
    emit(FallbackResult {
        opcode,
        reason,
        version: None,
        inner_type: None,
        detail: reason.as_str().to_string(),
        hexdump: hexdump(payload, hexdump_limit),
        raw: payload.to_vec(),
    })
}

/// Convert a decode-path error into a fallback result for `opcode`.
pub fn from_error(
    opcode: Opcode,
    payload: &[u8],
    version: Option<FormatVersion>,
    error: DecodeError,
    hexdump_limit: usize,
) -> FallbackResult {
    let reason = error.fallback_reason().unwrap_or(FallbackReason::MalformedLength);
    let detail = error.to_string();

    let (version, inner_type, raw) = match error {
        DecodeError::UnknownVersion { version, .. } => (Some(version), None, payload.to_vec()),
        DecodeError::UnrecognizedInnerType { inner_type, inner, .. } => {
            (version, Some(inner_type), inner)
        }
        _ => (version, None, payload.to_vec()),
    };

    emit(FallbackResult {
        opcode,
        reason,
        version,
        inner_type,
        detail,
        hexdump: hexdump(&raw, hexdump_limit),
        raw,
    })
}

fn emit(result: FallbackResult) -> FallbackResult {
    let version = result.version.map(|v| v.0);
    match result.reason {
        FallbackReason::UnknownOpcode => {
            warn!(opcode = %result.opcode, reason = %result.reason, "Unknown opcode")
        }
        FallbackReason::UnknownVersion => warn!(
            opcode = %result.opcode,
            reason = %result.reason,
            version,
            "Unknown version for opcode"
        ),
        FallbackReason::UnrecognizedInnerType => warn!(
            opcode = %result.opcode,
            reason = %result.reason,
            version,
            inner_type = result.inner_type,
            "Unrecognized inner message type"
        ),
        FallbackReason::MalformedLength => warn!(
            opcode = %result.opcode,
            reason = %result.reason,
            detail = %result.detail,
            "Malformed payload"
        ),
    }
    debug!(opcode = %result.opcode, hexdump = %result.hexdump, "Fallback payload");
    result
}

/// Render at most `limit` bytes as space-separated hex.
///
/// Cut dumps end with `…(+N bytes)` naming how much was left out.
pub fn hexdump(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut out = String::with_capacity(shown.len() * 3 + 16);
    for (i, byte) in shown.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", byte);
    }
    if bytes.len() > shown.len() {
        let _ = write!(out, " …(+{} bytes)", bytes.len() - shown.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_fallback_always_succeeds(
            opcode in any::<u32>(),
            payload in prop::collection::vec(any::<u8>(), 0..256),
            limit in 1usize..128
        ) {
            let result = handle(Opcode(opcode), &payload, FallbackReason::UnknownOpcode, limit);
            prop_assert_eq!(result.reason, FallbackReason::UnknownOpcode);
            prop_assert_eq!(&result.raw, &payload);
            prop_assert!(result.hexdump.len() <= limit * 3 + 32);
        }
    }

    #[test]
    fn hexdump_is_bounded_and_annotated() {
        assert_eq!(hexdump(&[0x09, 0x00, 0xff], 16), "09 00 ff");
        assert_eq!(hexdump(&[1, 2, 3, 4], 2), "01 02 …(+2 bytes)");
        assert_eq!(hexdump(&[], 8), "");
    }

    #[test]
    fn reason_tags_are_kebab_case() {
        assert_eq!(FallbackReason::UnknownOpcode.to_string(), "unknown-opcode");
        assert_eq!(FallbackReason::UnrecognizedInnerType.as_str(), "unrecognized-inner-type");

        let yaml = serde_yaml_ng::to_string(&FallbackReason::MalformedLength).unwrap();
        assert_eq!(yaml.trim(), "malformed-length");
    }

    #[test]
    fn version_error_records_embedded_version() {
        let error = DecodeError::UnknownVersion { opcode: Opcode(0xB822), version: FormatVersion(4) };
        let result = from_error(Opcode(0xB822), &[4, 0, 0, 0], None, error, 16);

        assert_eq!(result.reason, FallbackReason::UnknownVersion);
        assert_eq!(result.version, Some(FormatVersion(4)));
        assert!(result.detail.contains("0x04"));
    }

    #[test]
    fn inner_type_error_forwards_inner_bytes() {
        let error = DecodeError::UnrecognizedInnerType {
            opcode: Opcode(0xB821),
            inner_type: 1,
            inner: vec![0xde, 0xad],
        };
        let result = from_error(Opcode(0xB821), &[9, 0, 0, 0, 0xde, 0xad], Some(FormatVersion(9)), error, 16);

        assert_eq!(result.reason, FallbackReason::UnrecognizedInnerType);
        assert_eq!(result.inner_type, Some(1));
        assert_eq!(result.version, Some(FormatVersion(9)));
        assert_eq!(result.raw, vec![0xde, 0xad]);
        assert_eq!(result.hexdump, "de ad");
    }
}
