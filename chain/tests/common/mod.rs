use async_trait::async_trait;
use chain::{ChainStore, ForkChoiceReader, Replayer, StateCache, StateRegenerator, StateTransitionError};
use containers::{
    BeaconBlock, ChainState, ForkName, ProtoBlock, Root, SignedBeaconBlock, Slot, StateIndices,
    ValidatorIndex,
};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn root(byte: u8) -> Root {
    Root::from([byte; 32])
}

/// State root after applying the block at `slot` on top of `parent`.
pub fn post_block_root(parent: &Root, slot: u64) -> Root {
    digest(b"block", parent, slot)
}

/// State root after advancing `parent` through empty slots to `slot`.
pub fn advanced_root(parent: &Root, slot: u64) -> Root {
    digest(b"advance", parent, slot)
}

fn digest(tag: &[u8], parent: &Root, slot: u64) -> Root {
    let mut hasher = Sha256::new();
    hasher.update(tag);
    hasher.update(parent.0.as_slice());
    hasher.update(slot.to_le_bytes());
    let bytes: [u8; 32] = hasher.finalize().into();
    Root::from(bytes)
}

#[derive(Default)]
pub struct MockForkChoice {
    pub blocks: HashMap<Root, ProtoBlock>,
}

impl ForkChoiceReader for MockForkChoice {
    fn proto_block(&self, root: &Root) -> Option<ProtoBlock> {
        self.blocks.get(root).copied()
    }
}

#[derive(Default)]
pub struct MockStore {
    pub states: Mutex<HashMap<Root, Arc<ChainState>>>,
    pub blocks: HashMap<Root, Arc<SignedBeaconBlock>>,
    pub state_lookups: Arc<AtomicUsize>,
}

#[async_trait]
impl ChainStore for MockStore {
    async fn state_by_root(&self, root: &Root) -> Option<Arc<ChainState>> {
        self.state_lookups.fetch_add(1, Ordering::SeqCst);
        self.states.lock().get(root).cloned()
    }

    async fn block_by_root(&self, root: &Root) -> Option<Arc<SignedBeaconBlock>> {
        self.blocks.get(root).cloned()
    }
}

/// Deterministic stand-in for the state-transition function. State roots are
/// derived by hashing the replay inputs, so equal inputs always yield
/// bit-identical states.
pub struct MockReplayer {
    /// Block root by slot, so post-states can record `latest_block_root`
    /// without a codec.
    pub roots_by_slot: HashMap<Slot, Root>,
    pub fail_at: Option<Slot>,
    pub delay: Option<Duration>,
    pub applied: Arc<AtomicUsize>,
    pub advanced: Arc<AtomicUsize>,
}

#[async_trait]
impl Replayer for MockReplayer {
    async fn apply_block(
        &self,
        state: Arc<ChainState>,
        block: &SignedBeaconBlock,
    ) -> Result<Arc<ChainState>, StateTransitionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at == Some(block.slot()) {
            return Err(StateTransitionError(format!(
                "invalid block at slot {}",
                block.slot()
            )));
        }
        self.applied.fetch_add(1, Ordering::SeqCst);
        let block_root = self.roots_by_slot[&block.slot()];
        Ok(Arc::new(ChainState::new(
            state.fork,
            block.slot(),
            post_block_root(&state.state_root, block.slot().0),
            block_root,
            StateIndices::default(),
        )))
    }

    async fn advance_slots(&self, state: Arc<ChainState>, target_slot: Slot) -> Arc<ChainState> {
        self.advanced.fetch_add(1, Ordering::SeqCst);
        Arc::new(ChainState::new(
            state.fork,
            target_slot,
            advanced_root(&state.state_root, target_slot.0),
            state.latest_block_root,
            StateIndices::default(),
        ))
    }
}

pub struct Fixture {
    pub fork_choice: MockForkChoice,
    pub store: MockStore,
    pub replayer: MockReplayer,
    pub genesis: ProtoBlock,
    pub genesis_state: Arc<ChainState>,
    protos: HashMap<u64, ProtoBlock>,
}

/// Linear chain: genesis block at slot 0 anchored by its post-state in the
/// store, plus one block at each of `slots` (ascending), chained together.
/// Proto-block state roots mirror what `MockReplayer` computes, so replayed
/// states line up with fork-choice metadata exactly.
pub fn linear_chain(slots: &[u64]) -> Fixture {
    let genesis_root = root(1);
    let genesis_state_root = post_block_root(&Root::default(), 0);
    let genesis = ProtoBlock {
        root: genesis_root,
        parent_root: Root::default(),
        slot: Slot(0),
        state_root: genesis_state_root,
    };
    let genesis_state = Arc::new(ChainState::new(
        ForkName::Capella,
        Slot(0),
        genesis_state_root,
        genesis_root,
        StateIndices::default(),
    ));

    let mut fork_choice = MockForkChoice::default();
    let mut store = MockStore::default();
    let mut roots_by_slot = HashMap::new();
    let mut protos = HashMap::new();

    fork_choice.blocks.insert(genesis_root, genesis);
    store
        .states
        .lock()
        .insert(genesis_state_root, genesis_state.clone());
    roots_by_slot.insert(Slot(0), genesis_root);
    protos.insert(0, genesis);

    let mut parent = genesis;
    let mut parent_state_root = genesis_state_root;
    for (i, &slot) in slots.iter().enumerate() {
        let block_root = root(10 + i as u8);
        // Replay advances the parent state to this slot, then applies.
        let pre_root = advanced_root(&parent_state_root, slot);
        let state_root = post_block_root(&pre_root, slot);

        let message = BeaconBlock {
            slot: Slot(slot),
            proposer_index: ValidatorIndex(i as u64),
            parent_root: parent.root,
            state_root,
            body: Default::default(),
        };
        let signed = Arc::new(SignedBeaconBlock {
            message,
            signature: Default::default(),
        });
        let proto = ProtoBlock {
            root: block_root,
            parent_root: parent.root,
            slot: Slot(slot),
            state_root,
        };

        fork_choice.blocks.insert(block_root, proto);
        store.blocks.insert(block_root, signed);
        roots_by_slot.insert(Slot(slot), block_root);
        protos.insert(slot, proto);
        parent = proto;
        parent_state_root = state_root;
    }

    Fixture {
        fork_choice,
        store,
        replayer: MockReplayer {
            roots_by_slot,
            fail_at: None,
            delay: None,
            applied: Arc::new(AtomicUsize::new(0)),
            advanced: Arc::new(AtomicUsize::new(0)),
        },
        genesis,
        genesis_state,
        protos,
    }
}

impl Fixture {
    pub fn proto(&self, slot: u64) -> ProtoBlock {
        self.protos[&slot]
    }

    pub fn block(&self, slot: u64) -> Arc<SignedBeaconBlock> {
        self.store.blocks[&self.protos[&slot].root].clone()
    }

    /// The post-state of the block at `slot`, as the replayer would build it.
    pub fn post_state(&self, slot: u64) -> Arc<ChainState> {
        let proto = self.proto(slot);
        Arc::new(ChainState::new(
            ForkName::Capella,
            proto.slot,
            proto.state_root,
            proto.root,
            StateIndices::default(),
        ))
    }

    pub fn regen(self) -> StateRegenerator<MockForkChoice, MockStore, MockReplayer> {
        StateRegenerator::new(self.fork_choice, self.store, self.replayer)
    }

    pub fn regen_with_cache_size(
        self,
        max_states: usize,
    ) -> StateRegenerator<MockForkChoice, MockStore, MockReplayer> {
        StateRegenerator::with_cache(
            self.fork_choice,
            self.store,
            self.replayer,
            StateCache::new(max_states),
        )
    }
}
