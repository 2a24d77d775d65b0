//! Linker configuration.

use serde::{Deserialize, Serialize};

use crate::error::{BankError, BankResult};

/// Revision tag of bank files.
pub const BANK_REVISION: &str = "B1";

/// Default alignment of both tables.
pub const DEFAULT_ALIGNMENT: usize = 8;

/// Settings for [`crate::BankBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkerConfig {
    /// Alignment of records in the metadata table.
    #[serde(default = "default_alignment")]
    pub ctl_alignment: usize,
    /// Alignment of samples in the sample table.
    #[serde(default = "default_alignment")]
    pub tbl_alignment: usize,
    /// Two-character revision tag written to the header.
    #[serde(default = "default_revision")]
    pub revision: String,
}

fn default_alignment() -> usize {
    DEFAULT_ALIGNMENT
}

fn default_revision() -> String {
    BANK_REVISION.to_string()
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            ctl_alignment: default_alignment(),
            tbl_alignment: default_alignment(),
            revision: default_revision(),
        }
    }
}

impl LinkerConfig {
    /// Parses a configuration from JSON; absent keys take their defaults.
    pub fn from_json(json: &str) -> BankResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings describe a writable bank.
    pub fn validate(&self) -> BankResult<()> {
        if self.revision.len() != 2 {
            return Err(BankError::InvalidConfig {
                message: format!("revision '{}' must be exactly 2 bytes", self.revision),
            });
        }
        for (name, alignment) in [("ctl", self.ctl_alignment), ("tbl", self.tbl_alignment)] {
            if alignment == 0 || !alignment.is_power_of_two() {
                return Err(BankError::InvalidConfig {
                    message: format!("{name} alignment {alignment} is not a power of two"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = LinkerConfig::from_json("{}").unwrap();
        assert_eq!(config, LinkerConfig::default());
        assert_eq!(config.revision, "B1");
        assert_eq!(config.ctl_alignment, 8);
    }

    #[test]
    fn test_partial_override() {
        let config = LinkerConfig::from_json(r#"{"tbl_alignment": 16}"#).unwrap();
        assert_eq!(config.tbl_alignment, 16);
        assert_eq!(config.ctl_alignment, 8);
    }

    #[test]
    fn test_invalid() {
        assert!(LinkerConfig::from_json(r#"{"revision": "B12"}"#).is_err());
        assert!(LinkerConfig::from_json(r#"{"ctl_alignment": 6}"#).is_err());
        assert!(LinkerConfig::from_json(r#"{"bogus": 1}"#).is_err());
    }
}
