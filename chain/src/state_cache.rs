use containers::{ChainState, ProtoBlock, Root, Slot};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default maximum number of cached states.
pub const DEFAULT_STATE_CACHE_SIZE: usize = 96;

#[derive(Debug, Clone)]
struct CacheEntry {
    state: Arc<ChainState>,
    last_used: u64,
}

#[derive(Debug, Clone)]
struct Head {
    block: ProtoBlock,
    state: Option<Arc<ChainState>>,
}

/// Bounded store of recently produced state snapshots.
///
/// States are indexed by state root and by `(latest block root, slot)`.
/// Lookups bump recency; inserts evict least-recently-used entries above
/// capacity. The head state is pinned and excluded from eviction while it
/// remains head. A miss is a valid, expected outcome, not an error.
#[derive(Debug, Clone)]
pub struct StateCache {
    max_states: usize,
    /// Monotonic lookup clock for LRU bookkeeping.
    clock: u64,
    states: HashMap<Root, CacheEntry>,
    /// `(block root, slot)` -> state root secondary index.
    block_slot_index: HashMap<(Root, Slot), Root>,
    head: Option<Head>,
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_CACHE_SIZE)
    }
}

impl StateCache {
    pub fn new(max_states: usize) -> Self {
        Self {
            max_states,
            clock: 0,
            states: HashMap::new(),
            block_slot_index: HashMap::new(),
            head: None,
        }
    }

    /// Look up a state by its root, bumping recency.
    pub fn get(&mut self, state_root: &Root) -> Option<Arc<ChainState>> {
        self.clock += 1;
        let clock = self.clock;
        let entry = self.states.get_mut(state_root)?;
        entry.last_used = clock;
        Some(entry.state.clone())
    }

    /// Look up the state of `block_root` advanced to `slot`, bumping recency.
    pub fn get_by_block_slot(&mut self, block_root: &Root, slot: Slot) -> Option<Arc<ChainState>> {
        let state_root = *self.block_slot_index.get(&(*block_root, slot))?;
        self.get(&state_root)
    }

    /// Lookup without recency bookkeeping.
    pub fn peek(&self, state_root: &Root) -> Option<Arc<ChainState>> {
        self.states.get(state_root).map(|entry| entry.state.clone())
    }

    /// Insert a state under both indices, evicting least-recently-used
    /// entries if over capacity. Re-inserting an existing root refreshes it.
    pub fn insert(&mut self, state: Arc<ChainState>) {
        self.clock += 1;
        let state_root = state.state_root;
        self.block_slot_index
            .insert((state.latest_block_root, state.slot), state_root);
        self.states.insert(
            state_root,
            CacheEntry {
                state,
                last_used: self.clock,
            },
        );
        self.prune();
    }

    /// Pin the new canonical head. When `state` is not supplied (or does not
    /// match the head block's state root) it is resolved from the cache.
    pub fn set_head(&mut self, block: ProtoBlock, state: Option<Arc<ChainState>>) {
        let resolved = state
            .filter(|state| state.state_root == block.state_root)
            .or_else(|| self.peek(&block.state_root));

        self.head = Some(Head {
            block,
            state: resolved.clone(),
        });

        match resolved {
            // Keep the pinned state visible to root and block-slot lookups.
            Some(state) => self.insert(state),
            None => warn!(
                block_root = %block.root,
                state_root = %block.state_root,
                "Head state not available in cache; head pinned without state"
            ),
        }
    }

    pub fn head_block(&self) -> Option<&ProtoBlock> {
        self.head.as_ref().map(|head| &head.block)
    }

    pub fn head_state(&self) -> Option<Arc<ChainState>> {
        self.head.as_ref().and_then(|head| head.state.clone())
    }

    /// Number of cached states (the pinned head counts if indexed).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop all cached entries. The head pointer (and its pinned state)
    /// survives; it is re-indexed on the next insert.
    pub fn clear(&mut self) {
        self.states.clear();
        self.block_slot_index.clear();
    }

    /// Evict least-recently-used entries until within capacity. The head
    /// state is excluded from the candidate set.
    fn prune(&mut self) {
        while self.states.len() > self.max_states {
            let head_state_root = self.head.as_ref().map(|head| head.block.state_root);
            let victim = self
                .states
                .iter()
                .filter(|(root, _)| Some(**root) != head_state_root)
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(root, _)| *root);

            match victim {
                Some(root) => self.remove(&root),
                // Only the head remains; nothing evictable.
                None => break,
            }
        }
    }

    fn remove(&mut self, state_root: &Root) {
        if let Some(entry) = self.states.remove(state_root) {
            self.block_slot_index
                .remove(&(entry.state.latest_block_root, entry.state.slot));
            debug!(
                state_root = %state_root,
                slot = %entry.state.slot,
                "Evicted state from cache"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containers::{ChainState, ForkName, StateIndices};

    fn test_root(byte: u8) -> Root {
        Root::from([byte; 32])
    }

    fn test_state(slot: u64, block_byte: u8, state_byte: u8) -> Arc<ChainState> {
        Arc::new(ChainState::new(
            ForkName::Capella,
            Slot(slot),
            test_root(state_byte),
            test_root(block_byte),
            StateIndices::default(),
        ))
    }

    fn proto_for(state: &ChainState) -> ProtoBlock {
        ProtoBlock {
            root: state.latest_block_root,
            parent_root: Root::default(),
            slot: state.slot,
            state_root: state.state_root,
        }
    }

    #[test]
    fn test_get_after_insert() {
        let mut cache = StateCache::new(4);
        let state = test_state(1, 1, 11);
        cache.insert(state.clone());

        assert_eq!(cache.get(&test_root(11)), Some(state.clone()));
        assert_eq!(
            cache.get_by_block_slot(&test_root(1), Slot(1)),
            Some(state)
        );
        assert_eq!(cache.get(&test_root(99)), None);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = StateCache::new(2);
        let first = test_state(1, 1, 11);
        let second = test_state(2, 2, 22);
        cache.insert(first.clone());
        cache.insert(second);

        // Touch the older entry so the newer one becomes the LRU victim.
        cache.get(&test_root(11));
        cache.insert(test_state(3, 3, 33));

        assert!(cache.get(&test_root(11)).is_some());
        assert!(cache.get(&test_root(22)).is_none());
        assert!(cache.get(&test_root(33)).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_eviction_drops_block_slot_index() {
        let mut cache = StateCache::new(1);
        cache.insert(test_state(1, 1, 11));
        cache.insert(test_state(2, 2, 22));

        assert!(cache.get_by_block_slot(&test_root(1), Slot(1)).is_none());
        assert!(cache.get_by_block_slot(&test_root(2), Slot(2)).is_some());
    }

    #[test]
    fn test_head_never_evicted_by_capacity() {
        let mut cache = StateCache::new(2);
        let head_state = test_state(1, 1, 11);
        cache.set_head(proto_for(&head_state), Some(head_state.clone()));

        for byte in 2..=6 {
            cache.insert(test_state(byte as u64, byte, byte * 10));
        }

        assert_eq!(cache.get(&head_state.state_root), Some(head_state.clone()));
        assert_eq!(cache.head_state(), Some(head_state));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_previous_head_becomes_evictable() {
        let mut cache = StateCache::new(1);
        let old_head = test_state(1, 1, 11);
        cache.set_head(proto_for(&old_head), Some(old_head.clone()));

        let new_head = test_state(2, 2, 22);
        cache.set_head(proto_for(&new_head), Some(new_head.clone()));

        // Old head lost its pin and capacity pressure evicted it.
        assert!(cache.get(&old_head.state_root).is_none());
        assert_eq!(cache.head_state(), Some(new_head));
    }

    #[test]
    fn test_set_head_resolves_state_from_cache() {
        let mut cache = StateCache::new(4);
        let state = test_state(5, 5, 55);
        cache.insert(state.clone());

        cache.set_head(proto_for(&state), None);
        assert_eq!(cache.head_state(), Some(state));
    }

    #[test]
    fn test_set_head_without_state_pins_block_only() {
        let mut cache = StateCache::new(4);
        let state = test_state(5, 5, 55);

        cache.set_head(proto_for(&state), None);
        assert!(cache.head_state().is_none());
        assert_eq!(cache.head_block().map(|block| block.slot), Some(Slot(5)));
    }
}
