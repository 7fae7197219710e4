use crate::slot::Slot;
use crate::types::Root;
use serde::{Deserialize, Serialize};

/// Minimal fork-choice view of a block: enough to walk ancestry and locate
/// the block's post-state without loading either from disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtoBlock {
    pub root: Root,
    pub parent_root: Root,
    pub slot: Slot,
    /// Root of the state obtained by applying this block.
    pub state_root: Root,
}
