use async_trait::async_trait;
use containers::{ChainState, ProtoBlock, Root, SignedBeaconBlock, Slot};
use std::sync::Arc;

/// Reason a state was requested. Recorded for diagnostics only; never
/// affects control flow or the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegenCaller {
    GetDuties,
    ProduceBlock,
    ValidateGossipBlock,
    PrecomputeEpoch,
    ProduceAttestationData,
    ProcessBlocksInEpoch,
    ValidateGossipAggregateAndProof,
    ValidateGossipAttestation,
    OnForkChoiceFinalized,
    RegenHeadState,
}

/// Read-only view of fork choice: block summaries and ancestry.
pub trait ForkChoiceReader: Send + Sync {
    /// Summary of a block known to fork choice.
    fn proto_block(&self, root: &Root) -> Option<ProtoBlock>;

    /// Ancestors of `from` (inclusive), newest first, ending at the first
    /// block with `slot <= to_slot` or at the oldest known ancestor.
    fn ancestry_walk(&self, from: &Root, to_slot: Slot) -> Vec<ProtoBlock> {
        let mut path = Vec::new();
        let mut current = *from;
        while let Some(block) = self.proto_block(&current) {
            let parent = block.parent_root;
            let done = block.slot <= to_slot || parent.is_zero();
            path.push(block);
            if done {
                break;
            }
            current = parent;
        }
        path
    }
}

/// Cold-path block and state lookup beneath the state cache. The store owns
/// the canonical on-disk data; a miss is a valid outcome.
#[async_trait]
pub trait ChainStore: Send + Sync {
    async fn state_by_root(&self, root: &Root) -> Option<Arc<ChainState>>;
    async fn block_by_root(&self, root: &Root) -> Option<Arc<SignedBeaconBlock>>;
}

/// Failure from the state-transition function, propagated verbatim. This
/// core never interprets validity rules, only whether a result was produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StateTransitionError(pub String);

/// The state-transition function and empty-slot processing.
#[async_trait]
pub trait Replayer: Send + Sync {
    /// Apply `block` on top of `state`, producing the block's post-state.
    /// `state` must already sit at the block's slot.
    async fn apply_block(
        &self,
        state: Arc<ChainState>,
        block: &SignedBeaconBlock,
    ) -> Result<Arc<ChainState>, StateTransitionError>;

    /// Advance `state` through empty slots up to `target_slot`.
    async fn advance_slots(&self, state: Arc<ChainState>, target_slot: Slot) -> Arc<ChainState>;
}
