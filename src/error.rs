//! Error types for packet decoding.
//!
//! Every decode-path error is recoverable: the dispatcher converts it into a
//! [`FallbackResult`](crate::FallbackResult) and it never reaches the caller.
//! Errors still carry structured context so the fallback trace can say what
//! went wrong.
//!
//! ## Error Categories
//!
//! - **Unknown Opcode**: no decoder family registered for the log code
//! - **Unknown Version**: the family exists but has no layout for this version
//! - **Malformed Length**: payload shorter than a header, a declared length
//!   overrunning the payload, or a body that is not a whole number of entries
//! - **Unrecognized Inner Type**: a nested message tag missing from the
//!   family's inner table
//! - **Configuration Errors**: invalid or unreadable decoder configuration
//!
//! ## Operator Guidance
//!
//! ```rust
//! use modemlog::{DecodeError, FallbackReason, FormatVersion, Opcode};
//!
//! let error = DecodeError::UnknownVersion { opcode: Opcode(0xB821), version: FormatVersion(10) };
//! assert_eq!(error.fallback_reason(), Some(FallbackReason::UnknownVersion));
//! for hint in error.operator_hints() {
//!     println!("  - {}", hint);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::fallback::FallbackReason;
use crate::types::{FormatVersion, Opcode};

/// Result type alias for decode operations.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Main error type for decode operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("No decoder registered for opcode {opcode}")]
    UnknownOpcode { opcode: Opcode },

    #[error("Opcode {opcode} has no layout for version {version}")]
    UnknownVersion { opcode: Opcode, version: FormatVersion },

    #[error("Malformed length in {context}: need {needed} bytes, have {actual}")]
    MalformedLength { context: String, needed: usize, actual: usize },

    #[error("Body of {context} is {len} bytes, not a multiple of the {stride}-byte entry stride")]
    StrideMismatch { context: String, stride: usize, len: usize },

    #[error("Opcode {opcode} carries unrecognized inner type {inner_type:#04x}")]
    UnrecognizedInnerType { opcode: Opcode, inner_type: u32, inner: Vec<u8> },

    #[error("Layout error on field '{field}': {details}")]
    Layout { field: String, details: String },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    /// Fallback tag this error is reported under.
    ///
    /// Returns `None` for errors that can only occur outside the decode path.
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            DecodeError::UnknownOpcode { .. } => Some(FallbackReason::UnknownOpcode),
            DecodeError::UnknownVersion { .. } => Some(FallbackReason::UnknownVersion),
            DecodeError::MalformedLength { .. } => Some(FallbackReason::MalformedLength),
            DecodeError::StrideMismatch { .. } => Some(FallbackReason::MalformedLength),
            DecodeError::Layout { .. } => Some(FallbackReason::MalformedLength),
            DecodeError::UnrecognizedInnerType { .. } => {
                Some(FallbackReason::UnrecognizedInnerType)
            }
            DecodeError::Config { .. } => None,
            DecodeError::File { .. } => None,
        }
    }

    /// Returns suggested follow-up actions for this error.
    pub fn operator_hints(&self) -> Vec<&'static str> {
        match self {
            DecodeError::UnknownOpcode { .. } => vec![
                "Register a decoder family for this opcode",
                "Check whether the modem firmware added a new log code",
            ],
            DecodeError::UnknownVersion { .. } => vec![
                "Add a version layout to the existing decoder family",
                "Compare the payload against the newest known layout",
            ],
            DecodeError::MalformedLength { .. } | DecodeError::StrideMismatch { .. } => vec![
                "Check the transport strips framing exactly once",
                "Verify the capture is not truncated",
                "Compare entry stride against a fresh capture",
            ],
            DecodeError::UnrecognizedInnerType { .. } => vec![
                "Extend the family's inner type table",
                "Inspect the forwarded inner bytes offline",
            ],
            DecodeError::Layout { .. } => vec![
                "Check the version layout declares every field its assembler reads",
                "Verify field encodings match the assembler's accessors",
            ],
            DecodeError::Config { .. } => vec![
                "Check configuration keys and value ranges",
                "Remove unknown keys from the configuration file",
            ],
            DecodeError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
        }
    }

    /// Helper constructor for payloads shorter than a required length.
    pub fn malformed(context: impl Into<String>, needed: usize, actual: usize) -> Self {
        DecodeError::MalformedLength { context: context.into(), needed, actual }
    }

    /// Helper constructor for bodies that are not a whole number of entries.
    pub fn stride_mismatch(context: impl Into<String>, stride: usize, len: usize) -> Self {
        DecodeError::StrideMismatch { context: context.into(), stride, len }
    }

    /// Helper constructor for layout/assembler disagreements.
    pub fn layout(field: impl Into<String>, details: impl Into<String>) -> Self {
        DecodeError::Layout { field: field.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        DecodeError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        DecodeError::File { path, source }
    }
}

impl From<serde_yaml_ng::Error> for DecodeError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        DecodeError::Config { context: "YAML deserialization".to_string(), details: err.to_string() }
    }
}
