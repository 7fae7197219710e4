/// Sync operational constants.

/// Epochs covered by one by-range batch. Keeping batches to a single epoch
/// keeps every block of a response on one fork and bounds response size.
pub const EPOCHS_PER_BATCH: u64 = 1;

/// Maximum concurrent by-range batches in flight per peer.
pub const MAX_CONCURRENT_BATCHES: usize = 2;
