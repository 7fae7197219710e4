/// Range synchronization: reconciling block and sidecar ranges fetched from
/// a peer into a single ordered, fork-tagged sequence of block inputs.
///
/// A by-range batch covers one epoch. On blob-carrying forks the block range
/// and the sidecar range are fetched concurrently from the same peer and
/// merged by slot; any inconsistency discards the whole batch rather than
/// returning a partially trusted sequence.
pub mod config;
pub mod range_blocks;

pub use config::*;
pub use range_blocks::{blocks_maybe_blobs_by_range, RangeSyncError, ResponseKind};

#[cfg(test)]
mod tests;
