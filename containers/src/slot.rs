use crate::config::SLOTS_PER_EPOCH;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(pub u64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Epoch(pub u64);

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Slot {
    /// Epoch containing this slot.
    pub fn epoch(self) -> Epoch {
        Epoch(self.0 / SLOTS_PER_EPOCH)
    }

    /// Whether this slot is the first slot of its epoch.
    pub fn is_epoch_start(self) -> bool {
        self.0 % SLOTS_PER_EPOCH == 0
    }

    pub fn saturating_sub(self, rhs: u64) -> Slot {
        Slot(self.0.saturating_sub(rhs))
    }
}

impl Epoch {
    /// First slot of this epoch.
    pub fn start_slot(self) -> Slot {
        Slot(self.0 * SLOTS_PER_EPOCH)
    }

    pub fn saturating_sub(self, rhs: u64) -> Epoch {
        Epoch(self.0.saturating_sub(rhs))
    }
}

impl Add<u64> for Slot {
    type Output = Slot;

    fn add(self, rhs: u64) -> Slot {
        Slot(self.0 + rhs)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
