use crate::slot::Slot;
use crate::types::{Bytes32, KzgCommitment, Root, Signature, ValidatorIndex};
use serde::{Deserialize, Serialize};

/// The body of a block. Only the fields this core inspects are modeled;
/// everything else is carried opaquely by the codec layer.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconBlockBody {
    pub randao_reveal: Signature,
    pub graffiti: Bytes32,
    /// Commitments to the blobs published alongside this block. Empty for
    /// pre-blob forks and for blobless blocks.
    pub blob_kzg_commitments: Vec<KzgCommitment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconBlock {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Root,
    pub state_root: Root,
    pub body: BeaconBlockBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: Signature,
}

impl SignedBeaconBlock {
    pub fn slot(&self) -> Slot {
        self.message.slot
    }

    pub fn parent_root(&self) -> Root {
        self.message.parent_root
    }

    /// Number of blob commitments the block declares. Nonzero means a real
    /// sidecar must accompany the block.
    pub fn commitment_count(&self) -> usize {
        self.message.body.blob_kzg_commitments.len()
    }
}
