//! Decoder configuration
//!
//! Configuration is read once, when a [`DispatchTable`](crate::DispatchTable)
//! is built. Nothing in it can change afterwards.
//!
//! ```yaml
//! hexdump_limit: 128
//! disabled_opcodes: [0xB826]
//! quiet_stubs: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::fallback::DEFAULT_HEXDUMP_LIMIT;
use crate::{DecodeError, Result};

/// Upper bound accepted for `hexdump_limit`.
pub const MAX_HEXDUMP_LIMIT: usize = 65_536;

/// Settings consumed when building a dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Maximum payload bytes rendered into a fallback hex dump
    pub hexdump_limit: usize,
    /// Opcodes left out of the table; they take the unknown-opcode path
    pub disabled_opcodes: Vec<u32>,
    /// Log known-but-undecoded opcodes at debug instead of warn
    pub quiet_stubs: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { hexdump_limit: DEFAULT_HEXDUMP_LIMIT, disabled_opcodes: Vec::new(), quiet_stubs: false }
    }
}

impl DecoderConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: DecoderConfig = if yaml.trim().is_empty() {
            DecoderConfig::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        debug!(
            hexdump_limit = config.hexdump_limit,
            disabled = config.disabled_opcodes.len(),
            quiet_stubs = config.quiet_stubs,
            "Loaded decoder configuration"
        );
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| DecodeError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.hexdump_limit == 0 || self.hexdump_limit > MAX_HEXDUMP_LIMIT {
            return Err(DecodeError::config(
                "hexdump_limit",
                format!("must be within 1..={}, got {}", MAX_HEXDUMP_LIMIT, self.hexdump_limit),
            ));
        }
        Ok(())
    }

    /// Serialize back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}
