/// State reconstruction core: the bounded state cache and the on-demand
/// state regenerator sitting between fork choice, the cold store, and the
/// state-transition function.
pub mod interface;
pub mod regen;
pub mod state_cache;

pub use interface::{ChainStore, ForkChoiceReader, RegenCaller, Replayer, StateTransitionError};
pub use regen::{RegenError, RegenKey, StateRegenerator};
pub use state_cache::{StateCache, DEFAULT_STATE_CACHE_SIZE};
