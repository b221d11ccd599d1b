//! Execution role of the current process.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which side of the silo boundary this process runs on.
///
/// Injected through service config into every component that cares; there is
/// no ambient global lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiloMode {
    Control,
    Region,
    /// Single-process development deployment holding both roles.
    Monolith,
}

impl SiloMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Region => "region",
            Self::Monolith => "monolith",
        }
    }
}

impl fmt::Display for SiloMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown silo mode: {0}")]
pub struct UnknownSiloMode(pub String);

impl FromStr for SiloMode {
    type Err = UnknownSiloMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "control" => Ok(Self::Control),
            "region" => Ok(Self::Region),
            "monolith" => Ok(Self::Monolith),
            _ => Err(UnknownSiloMode(s.to_owned())),
        }
    }
}
