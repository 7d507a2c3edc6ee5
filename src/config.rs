//! Engine configuration, read from a JSON file
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DeclarationError;
use crate::registry::InstrumentTypeCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Type a session starts with when the requested code is unknown.
    pub fallback_type: InstrumentTypeCode,
    /// Branch number given to new forms, `00000` being the head office.
    pub default_branch_no: String,
    /// Reject declarations whose expire date precedes the effective date.
    pub check_date_order: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_type: InstrumentTypeCode::Lease,
            default_branch_no: "00000".into(),
            check_date_order: true,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    fn check(&self) -> Result<(), DeclarationError> {
        let branch = &self.default_branch_no;
        if branch.len() != 5 || !branch.chars().all(|c| c.is_ascii_digit()) {
            return Err(DeclarationError::InvalidConfig(format!(
                "default_branch_no must be five digits, got '{branch}'"
            )));
        }
        Ok(())
    }
}
