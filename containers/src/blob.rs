use crate::block::SignedBeaconBlock;
use crate::slot::Slot;
use crate::types::{KzgProof, Root};
use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Opaque blob payload. Contents are validated by the availability layer.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(pub Bytes);

/// Auxiliary per-block blob data, carried separately from the block body on
/// blob-carrying forks. Deserialized from a peer response or synthesized as
/// an empty placeholder for blobless blocks; consumed immediately by
/// `BlockInput` construction.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobsSidecar {
    pub beacon_block_root: Root,
    pub beacon_block_slot: Slot,
    pub blobs: Vec<Blob>,
    pub kzg_aggregated_proof: KzgProof,
}

impl BlobsSidecar {
    /// Placeholder sidecar for a block that declares no blob commitments.
    ///
    /// The block root is left zeroed: computing it needs the codec layer,
    /// and import re-derives the association from the block itself.
    pub fn empty_for_block(block: &SignedBeaconBlock) -> Self {
        Self {
            beacon_block_root: Root::default(),
            beacon_block_slot: block.slot(),
            blobs: Vec::new(),
            kzg_aggregated_proof: KzgProof::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_placeholder_tracks_block_slot() {
        let mut block = SignedBeaconBlock::default();
        block.message.slot = Slot(42);

        let sidecar = BlobsSidecar::empty_for_block(&block);
        assert_eq!(sidecar.beacon_block_slot, Slot(42));
        assert!(sidecar.is_empty());
        assert!(sidecar.beacon_block_root.is_zero());
    }
}
