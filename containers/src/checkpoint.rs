use crate::slot::{Epoch, Slot};
use crate::types::Root;
use serde::{Deserialize, Serialize};

/// An epoch-boundary chain point: the epoch together with the most recent
/// block at or before its first slot.
///
/// The state obtained for a checkpoint always satisfies
/// `state.slot == epoch * SLOTS_PER_EPOCH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Root,
}

impl Checkpoint {
    /// The slot a state for this checkpoint must sit at.
    pub fn start_slot(&self) -> Slot {
        self.epoch.start_slot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SLOTS_PER_EPOCH;

    #[test]
    fn test_default_checkpoint() {
        let checkpoint = Checkpoint::default();
        assert!(checkpoint.root.is_zero());
        assert_eq!(checkpoint.epoch, Epoch(0));
    }

    #[test]
    fn test_checkpoint_start_slot() {
        let checkpoint = Checkpoint {
            epoch: Epoch(7),
            root: Root::default(),
        };
        assert_eq!(checkpoint.start_slot(), Slot(7 * SLOTS_PER_EPOCH));
        assert!(checkpoint.start_slot().is_epoch_start());
    }
}
