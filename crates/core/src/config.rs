//! Decoder configuration

use crate::types::Architecture;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Newest metadata ABI version the decoder understands
pub const CURRENT_ABI_VERSION: u32 = 1;

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Metadata header layout version
    pub abi_version: u32,
    /// Architecture that produced the metadata (decides the word size)
    pub architecture: Architecture,
    /// Longest string the readers will scan for a terminator
    pub max_string_len: usize,
    /// Decode batches on the rayon pool
    pub parallel: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            abi_version: CURRENT_ABI_VERSION,
            architecture: Architecture::host(),
            max_string_len: 4096,
            parallel: true,
        }
    }
}

impl DecoderConfig {
    /// Load configuration from file
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| crate::Error::parse(e.to_string()))?;
        config.validate()?;
        debug!("Loaded decoder configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the decoder cannot honour
    pub fn validate(&self) -> crate::Result<()> {
        if self.abi_version == 0 || self.abi_version > CURRENT_ABI_VERSION {
            return Err(crate::Error::UnsupportedVersion(self.abi_version));
        }
        if self.max_string_len == 0 {
            return Err(crate::Error::config("max_string_len must be non-zero"));
        }
        Ok(())
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
