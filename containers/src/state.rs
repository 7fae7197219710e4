use crate::fork::ForkName;
use crate::slot::{Epoch, Slot};
use crate::types::{Root, ValidatorIndex};
use serde::{Deserialize, Serialize};

/// Lookup tables derived from a state when it is constructed.
///
/// Committee and proposer assignment are pure functions of the state, so the
/// producer (replayer or store) computes them once and the snapshot carries
/// them for duty computation and gossip validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateIndices {
    /// Committee assignment for the state's current epoch, by committee index.
    pub committees: Vec<Vec<ValidatorIndex>>,
    /// Proposer for each slot of the state's current epoch.
    pub proposers: Vec<ValidatorIndex>,
}

/// Immutable, fork-versioned snapshot of the consensus state at a slot.
///
/// Published behind `Arc` and shared between the state cache and in-flight
/// callers; never mutated once published. "Mutation" (slot advance, block
/// application) always produces a new snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainState {
    pub fork: ForkName,
    pub slot: Slot,
    /// Hash tree root of the state contents, computed by the codec layer.
    pub state_root: Root,
    /// Root of the last block applied to this state. Stays fixed across
    /// empty-slot advances.
    pub latest_block_root: Root,
    pub indices: StateIndices,
}

impl ChainState {
    pub fn new(
        fork: ForkName,
        slot: Slot,
        state_root: Root,
        latest_block_root: Root,
        indices: StateIndices,
    ) -> Self {
        Self {
            fork,
            slot,
            state_root,
            latest_block_root,
            indices,
        }
    }

    pub fn current_epoch(&self) -> Epoch {
        self.slot.epoch()
    }
}
