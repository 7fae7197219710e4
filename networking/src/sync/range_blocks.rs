use crate::reqresp::{BlocksByRangeRequest, ReqRespClient, ReqRespError};
use containers::{BlobsSidecar, BlockInput, ChainConfig, Epoch, Slot};
use libp2p_identity::PeerId;
use std::fmt;
use tracing::{debug, warn};

/// Which peer-returned sequence violated slot ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    Blocks,
    Sidecars,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKind::Blocks => write!(f, "blocks"),
            ResponseKind::Sidecars => write!(f, "sidecars"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RangeSyncError {
    /// Caller contract: by-range requests must stay within one epoch.
    #[error("blocks by range request must be within a single epoch: {start_epoch} != {end_epoch}")]
    MultiEpochRange {
        start_epoch: Epoch,
        end_epoch: Epoch,
    },
    /// Caller contract: sidecars below the retention window are pruned by
    /// peers and must not be requested.
    #[error("cannot sync blobs at epoch {request_epoch}, outside retention window at epoch {current_epoch}")]
    OutsideRetentionWindow {
        request_epoch: Epoch,
        current_epoch: Epoch,
    },
    /// The peer omitted the sidecar for a block that declares commitments.
    #[error("missing blobs sidecar for block at slot {slot} with {commitment_count} commitments")]
    MissingSidecar { slot: Slot, commitment_count: usize },
    /// Sidecars were left over after every block was matched; the pairing
    /// cannot be trusted and the whole batch is discarded.
    #[error(
        "unmatched blobs sidecars: blocks={blocks}, sidecars={sidecars}, \
         last_matched_slot={last_matched_slot:?}, pending_slots={pending_slots:?}"
    )]
    UnmatchedSidecars {
        blocks: usize,
        sidecars: usize,
        last_matched_slot: Option<Slot>,
        pending_slots: Vec<Slot>,
    },
    /// A peer response was not strictly ascending by slot.
    #[error("{kind} response out of order at slot {slot}")]
    UnsortedResponse { kind: ResponseKind, slot: Slot },
    #[error(transparent)]
    ReqResp(#[from] ReqRespError),
}

/// Fetch a single-epoch block range from `peer` and, on blob-carrying forks,
/// the matching sidecar range, merged by slot into ordered [`BlockInput`]s.
///
/// Reconciliation is all-or-nothing: any inconsistency in the peer response
/// fails the whole batch and no partial results are returned, because a
/// wrongly matched block/sidecar pairing would poison downstream validation.
pub async fn blocks_maybe_blobs_by_range<C: ReqRespClient>(
    config: &ChainConfig,
    reqresp: &C,
    peer: PeerId,
    request: BlocksByRangeRequest,
    current_epoch: Epoch,
) -> Result<Vec<BlockInput>, RangeSyncError> {
    // Range sync batches are epoch-bounded; double check the caller held
    // that contract before anything is fetched.
    let start_epoch = request.start_slot.epoch();
    let end_epoch = (request.start_slot + request.count).epoch();
    if start_epoch != end_epoch {
        return Err(RangeSyncError::MultiEpochRange {
            start_epoch,
            end_epoch,
        });
    }

    // The fork at the start slot governs the whole (single-epoch) range.
    let fork = config.fork_at_slot(request.start_slot);
    if !fork.has_blob_sidecars() {
        let blocks = reqresp.blocks_by_range(peer, request).await?;
        ensure_ascending(ResponseKind::Blocks, blocks.iter().map(|block| block.slot()))?;
        return Ok(blocks
            .into_iter()
            .map(|block| BlockInput::pre_deneb(fork, block))
            .collect());
    }

    // Peers prune sidecars beyond the retention window.
    if start_epoch
        < current_epoch.saturating_sub(config.min_epochs_for_blob_sidecars_requests)
    {
        return Err(RangeSyncError::OutsideRetentionWindow {
            request_epoch: start_epoch,
            current_epoch,
        });
    }

    let (blocks, sidecars) = tokio::try_join!(
        reqresp.blocks_by_range(peer, request),
        reqresp.blobs_sidecars_by_range(peer, request),
    )?;
    ensure_ascending(ResponseKind::Blocks, blocks.iter().map(|block| block.slot()))?;
    ensure_ascending(
        ResponseKind::Sidecars,
        sidecars.iter().map(|sidecar| sidecar.beacon_block_slot),
    )?;

    debug!(
        peer = %peer,
        start_slot = %request.start_slot,
        count = request.count,
        blocks = blocks.len(),
        sidecars = sidecars.len(),
        "Merging block and sidecar ranges"
    );

    let total_blocks = blocks.len();
    let total_sidecars = sidecars.len();
    let mut block_inputs = Vec::with_capacity(total_blocks);
    let mut sidecar_iter = sidecars.into_iter().peekable();
    let mut last_matched_slot: Option<Slot> = None;

    // Peers omit sidecars for blobless blocks, so both sequences advance
    // under a single forward cursor. A block with commitments but no
    // matching sidecar fails the batch.
    for block in blocks {
        let slot = block.slot();
        let blobs = match sidecar_iter.next_if(|sidecar| sidecar.beacon_block_slot == slot) {
            Some(sidecar) => {
                last_matched_slot = Some(slot);
                sidecar
            }
            None => {
                let commitment_count = block.commitment_count();
                if commitment_count != 0 {
                    warn!(
                        peer = %peer,
                        slot = %slot,
                        commitment_count,
                        "Peer omitted blobs sidecar for block with commitments"
                    );
                    return Err(RangeSyncError::MissingSidecar {
                        slot,
                        commitment_count,
                    });
                }
                BlobsSidecar::empty_for_block(&block)
            }
        };
        block_inputs.push(BlockInput::post_deneb(fork, block, blobs));
    }

    // Trailing sidecars mean the response was inconsistent and the matching
    // above cannot be trusted; discard the entire batch.
    let pending_slots: Vec<Slot> = sidecar_iter
        .map(|sidecar| sidecar.beacon_block_slot)
        .collect();
    if !pending_slots.is_empty() {
        warn!(
            peer = %peer,
            blocks = total_blocks,
            sidecars = total_sidecars,
            ?last_matched_slot,
            ?pending_slots,
            "Unmatched blobs sidecars in range response"
        );
        return Err(RangeSyncError::UnmatchedSidecars {
            blocks: total_blocks,
            sidecars: total_sidecars,
            last_matched_slot,
            pending_slots,
        });
    }

    Ok(block_inputs)
}

/// The merge assumes both peer sequences arrive strictly ascending by slot;
/// verify that up front so an out-of-order peer is distinguishable from an
/// omitting one.
fn ensure_ascending(
    kind: ResponseKind,
    slots: impl Iterator<Item = Slot>,
) -> Result<(), RangeSyncError> {
    let mut previous: Option<Slot> = None;
    for slot in slots {
        if previous.is_some_and(|previous| previous >= slot) {
            return Err(RangeSyncError::UnsortedResponse { kind, slot });
        }
        previous = Some(slot);
    }
    Ok(())
}
