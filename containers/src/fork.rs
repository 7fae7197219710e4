use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol fork, ordered by activation. Comparing variants compares
/// activation order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
}

impl ForkName {
    /// Whether blocks at this fork carry blob sidecars as separate units
    /// alongside the block body.
    pub fn has_blob_sidecars(self) -> bool {
        self >= ForkName::Deneb
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForkName::Phase0 => "phase0",
            ForkName::Altair => "altair",
            ForkName::Bellatrix => "bellatrix",
            ForkName::Capella => "capella",
            ForkName::Deneb => "deneb",
        };
        write!(f, "{name}")
    }
}
