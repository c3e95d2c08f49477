//! Copy-propagation configuration
//!
//! Switches that decide which instruction effects feed alias facts. A
//! disabled feature does not lose soundness: the effect degrades to a plain
//! register clobber.

use crate::error::ConfigError;
use crate::value::Register;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyPropConfig {
    /// Track 64-bit moves and constants as register pairs
    pub wide_registers: bool,
    /// Alias registers with reads of static final fields
    pub static_finals: bool,
    pub eliminate_const_literals: bool,
    pub eliminate_const_strings: bool,
    pub eliminate_const_classes: bool,
    /// Rewrite operands to their group representative
    pub replace_with_representative: bool,
    /// Highest register index the target encoding can address
    pub max_addressable: Option<Register>,
}

impl Default for CopyPropConfig {
    fn default() -> Self {
        Self {
            wide_registers: true,
            static_finals: true,
            eliminate_const_literals: true,
            eliminate_const_strings: true,
            eliminate_const_classes: true,
            replace_with_representative: true,
            max_addressable: None,
        }
    }
}

impl CopyPropConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Bound to pass to `representative` for an operand slot
    ///
    /// `slot_limit` is the limit of the instruction form at hand; the
    /// tighter of it and the configured bound wins. `None` when rewriting to
    /// representatives is switched off.
    pub fn representative_bound(&self, slot_limit: Option<Register>) -> Option<Option<Register>> {
        if !self.replace_with_representative {
            return None;
        }
        let bound = match (self.max_addressable, slot_limit) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Some(bound)
    }
}
