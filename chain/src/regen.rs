use crate::interface::{ChainStore, ForkChoiceReader, RegenCaller, Replayer, StateTransitionError};
use crate::state_cache::StateCache;
use containers::{BeaconBlock, ChainState, Checkpoint, Epoch, ProtoBlock, Root, Slot};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Typed regen failure. Every variant carries the identities needed for
/// triage without re-running the request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegenError {
    /// The ancestry walk ran out of known blocks before reaching any state.
    #[error("no known state on the ancestry of block {block_root}")]
    AncestorNotFound { block_root: Root },
    /// Fork choice does not know the requested block at all.
    #[error("block {root} is not in fork choice")]
    BlockNotInForkChoice { root: Root },
    /// A block on the replay path is missing from the store.
    #[error("block {root} not found in store during replay")]
    BlockNotFound { root: Root },
    #[error("requested slot {slot} is before block slot {block_slot}")]
    SlotBeforeBlock { slot: Slot, block_slot: Slot },
    #[error("checkpoint state for epoch {epoch} landed on slot {slot}")]
    InvalidCheckpoint { epoch: Epoch, slot: Slot },
    #[error("state {state_root} not found in cache or store")]
    StateNotFound { state_root: Root },
    /// Replay of an intermediate block failed; the replayer's verdict is
    /// propagated verbatim.
    #[error("replay of block {block_root} failed")]
    StateTransitionFailed {
        block_root: Root,
        #[source]
        source: StateTransitionError,
    },
    /// The task computing this request's result stopped without producing one.
    #[error("in-flight regen computation was dropped")]
    Interrupted,
}

/// Regen request key. Two concurrent requests with an equal key share one
/// in-flight computation and receive the same outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegenKey {
    PreState { parent_root: Root, block_slot: Slot },
    CheckpointState { root: Root, epoch: Epoch },
    BlockSlotState { block_root: Root, slot: Slot },
    ExactState { state_root: Root },
}

type RegenResult = Result<Arc<ChainState>, RegenError>;
type PendingRx = watch::Receiver<Option<RegenResult>>;

enum Role {
    Leader(watch::Sender<Option<RegenResult>>),
    Follower(PendingRx),
}

/// Produces chain states on demand for validation and duty computation.
///
/// The state cache is the fast path; the replayer (state-transition function
/// over the block store) is the fallback. Each request shape is keyed and
/// deduplicated: a request either registers a new in-flight computation or
/// attaches to an existing one, so an expensive replay runs at most once per
/// key no matter how many callers race on it.
pub struct StateRegenerator<F, S, R> {
    cache: Mutex<StateCache>,
    fork_choice: F,
    store: S,
    replayer: R,
    pending: Mutex<HashMap<RegenKey, PendingRx>>,
}

impl<F, S, R> StateRegenerator<F, S, R>
where
    F: ForkChoiceReader,
    S: ChainStore,
    R: Replayer,
{
    pub fn new(fork_choice: F, store: S, replayer: R) -> Self {
        Self::with_cache(fork_choice, store, replayer, StateCache::default())
    }

    pub fn with_cache(fork_choice: F, store: S, replayer: R, cache: StateCache) -> Self {
        Self {
            cache: Mutex::new(cache),
            fork_choice,
            store,
            replayer,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Current head state; `None` only before the node has a head.
    pub fn get_head_state(&self) -> Option<Arc<ChainState>> {
        self.cache.lock().head_state()
    }

    /// Called by fork choice on canonical-head change. Does not cancel
    /// in-flight computations; only re-pins the cache's head entry.
    pub fn set_head(&self, head: ProtoBlock, state: Option<Arc<ChainState>>) {
        debug!(block_root = %head.root, slot = %head.slot, "Pinning new head state");
        self.cache.lock().set_head(head, state);
    }

    /// State immediately before `block` would be applied.
    pub async fn get_pre_state(&self, block: &BeaconBlock, caller: RegenCaller) -> RegenResult {
        let parent_root = block.parent_root;
        debug!(
            ?caller,
            parent_root = %parent_root,
            block_slot = %block.slot,
            "Regen pre-state request"
        );

        // Hot path: the block builds on the current head.
        {
            let cache = self.cache.lock();
            if cache.head_block().map(|head| head.root) == Some(parent_root) {
                if let Some(state) = cache.head_state() {
                    return Ok(state);
                }
            }
        }

        let parent = self
            .fork_choice
            .proto_block(&parent_root)
            .ok_or(RegenError::BlockNotInForkChoice { root: parent_root })?;

        // Either the exact pre-state from an earlier request, or the
        // parent's own post-state.
        let target_slot = block.slot.saturating_sub(1);
        {
            let mut cache = self.cache.lock();
            if let Some(state) = cache
                .get_by_block_slot(&parent_root, target_slot)
                .or_else(|| cache.get_by_block_slot(&parent_root, parent.slot))
            {
                return Ok(state);
            }
        }

        let key = RegenKey::PreState {
            parent_root,
            block_slot: block.slot,
        };
        self.single_flight(key, caller, self.replay_to(parent_root, target_slot))
            .await
    }

    /// State at exactly `checkpoint.epoch * SLOTS_PER_EPOCH` on the
    /// checkpoint block's chain.
    pub async fn get_checkpoint_state(
        &self,
        checkpoint: &Checkpoint,
        caller: RegenCaller,
    ) -> RegenResult {
        let target_slot = checkpoint.start_slot();
        debug!(
            ?caller,
            root = %checkpoint.root,
            epoch = %checkpoint.epoch,
            "Regen checkpoint-state request"
        );

        let block = self
            .fork_choice
            .proto_block(&checkpoint.root)
            .ok_or(RegenError::BlockNotInForkChoice {
                root: checkpoint.root,
            })?;
        if block.slot > target_slot {
            return Err(RegenError::InvalidCheckpoint {
                epoch: checkpoint.epoch,
                slot: block.slot,
            });
        }

        if let Some(state) = self
            .cache
            .lock()
            .get_by_block_slot(&checkpoint.root, target_slot)
        {
            return Ok(state);
        }

        let key = RegenKey::CheckpointState {
            root: checkpoint.root,
            epoch: checkpoint.epoch,
        };
        let state = self
            .single_flight(key, caller, self.replay_to(checkpoint.root, target_slot))
            .await?;

        // Unreachable with correct inputs and a correct replayer.
        if state.slot != target_slot || !state.slot.is_epoch_start() {
            warn!(
                epoch = %checkpoint.epoch,
                slot = %state.slot,
                "Checkpoint state missed its epoch boundary"
            );
            return Err(RegenError::InvalidCheckpoint {
                epoch: checkpoint.epoch,
                slot: state.slot,
            });
        }
        Ok(state)
    }

    /// State of `block_root` advanced to an arbitrary `slot >= block.slot`,
    /// with empty-slot processing for slots that carry no block.
    pub async fn get_block_slot_state(
        &self,
        block_root: &Root,
        slot: Slot,
        caller: RegenCaller,
    ) -> RegenResult {
        debug!(?caller, block_root = %block_root, slot = %slot, "Regen block-slot-state request");

        let block = self
            .fork_choice
            .proto_block(block_root)
            .ok_or(RegenError::BlockNotInForkChoice { root: *block_root })?;
        if slot < block.slot {
            return Err(RegenError::SlotBeforeBlock {
                slot,
                block_slot: block.slot,
            });
        }

        if let Some(state) = self.cache.lock().get_by_block_slot(block_root, slot) {
            return Ok(state);
        }

        let key = RegenKey::BlockSlotState {
            block_root: *block_root,
            slot,
        };
        self.single_flight(key, caller, self.replay_to(*block_root, slot))
            .await
    }

    /// Exact state by identity: cache first, then the cold store.
    pub async fn get_state(&self, state_root: &Root, caller: RegenCaller) -> RegenResult {
        debug!(?caller, state_root = %state_root, "Regen exact-state request");

        if let Some(state) = self.cache.lock().get(state_root) {
            return Ok(state);
        }

        let state_root = *state_root;
        let key = RegenKey::ExactState { state_root };
        self.single_flight(key, caller, async move {
            let state = self
                .store
                .state_by_root(&state_root)
                .await
                .ok_or(RegenError::StateNotFound { state_root })?;
            self.cache.lock().insert(state.clone());
            Ok(state)
        })
        .await
    }

    /// Either registers a new in-flight computation for `key` or attaches to
    /// the existing one. Lookup and registration are a single atomic step.
    async fn single_flight<Fut>(&self, key: RegenKey, caller: RegenCaller, compute: Fut) -> RegenResult
    where
        Fut: Future<Output = RegenResult>,
    {
        let role = {
            let mut pending = self.pending.lock();
            match pending.get(&key) {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    pending.insert(key, rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                debug!(?key, ?caller, "Attaching to in-flight regen computation");
                loop {
                    if let Some(result) = rx.borrow().clone() {
                        return result;
                    }
                    if rx.changed().await.is_err() {
                        // Leader dropped without publishing a result.
                        return rx.borrow().clone().unwrap_or(Err(RegenError::Interrupted));
                    }
                }
            }
            Role::Leader(tx) => {
                let result = compute.await;
                self.pending.lock().remove(&key);
                // Publish to any attached followers; there may be none.
                let _ = tx.send(Some(result.clone()));
                result
            }
        }
    }

    /// Reconstruct the state of `block_root` advanced to `target_slot`.
    ///
    /// Walks ancestry back to the nearest ancestor whose post-state is in
    /// the cache or the store, replays every intermediate block forward
    /// (advancing empty slots in between), advances to the target slot, and
    /// caches the result.
    async fn replay_to(&self, block_root: Root, target_slot: Slot) -> RegenResult {
        let mut to_replay: Vec<ProtoBlock> = Vec::new();
        let mut current = block_root;

        let anchor = loop {
            let Some(block) = self.fork_choice.proto_block(&current) else {
                return Err(RegenError::AncestorNotFound { block_root });
            };
            let cached = self.cache.lock().get(&block.state_root);
            if let Some(state) = cached {
                break state;
            }
            if let Some(state) = self.store.state_by_root(&block.state_root).await {
                break state;
            }
            let parent = block.parent_root;
            to_replay.push(block);
            if parent.is_zero() {
                return Err(RegenError::AncestorNotFound { block_root });
            }
            current = parent;
        };

        debug!(
            blocks = to_replay.len(),
            anchor_slot = %anchor.slot,
            target_slot = %target_slot,
            "Replaying blocks onto anchor state"
        );

        let mut state = anchor;
        for summary in to_replay.iter().rev() {
            let Some(block) = self.store.block_by_root(&summary.root).await else {
                return Err(RegenError::BlockNotFound { root: summary.root });
            };
            if state.slot < block.slot() {
                state = self.replayer.advance_slots(state, block.slot()).await;
            }
            state = self
                .replayer
                .apply_block(state, &block)
                .await
                .map_err(|source| RegenError::StateTransitionFailed {
                    block_root: summary.root,
                    source,
                })?;
        }
        if state.slot < target_slot {
            state = self.replayer.advance_slots(state, target_slot).await;
        }

        self.cache.lock().insert(state.clone());
        Ok(state)
    }
}
