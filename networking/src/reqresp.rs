use async_trait::async_trait;
use containers::{BlobsSidecar, SignedBeaconBlock, Slot};
use libp2p_identity::PeerId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of blocks in a single by-range request.
pub const MAX_REQUEST_BLOCKS: u64 = 1024;

pub const BLOCKS_BY_RANGE_PROTOCOL_V2: &str =
    "/eth2/beacon_chain/req/beacon_blocks_by_range/2/ssz_snappy";
pub const BLOBS_SIDECARS_BY_RANGE_PROTOCOL_V1: &str =
    "/eth2/beacon_chain/req/blobs_sidecars_by_range/1/ssz_snappy";

/// Slot-range request, shared by the block and blob-sidecar range protocols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocksByRangeRequest {
    pub start_slot: Slot,
    pub count: u64,
}

/// Transport-level failure from the network collaborator, propagated to
/// callers unchanged. Retry policy belongs to the caller, not this core.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReqRespError {
    #[error("request to peer failed: {0}")]
    Transport(String),
    #[error("peer response failed to decode: {0}")]
    InvalidResponse(String),
}

/// The req/resp surface this core consumes. Implemented by the network
/// service over the wire protocols above; mocked in tests.
#[async_trait]
pub trait ReqRespClient: Send + Sync {
    async fn blocks_by_range(
        &self,
        peer: PeerId,
        request: BlocksByRangeRequest,
    ) -> Result<Vec<Arc<SignedBeaconBlock>>, ReqRespError>;

    async fn blobs_sidecars_by_range(
        &self,
        peer: PeerId,
        request: BlocksByRangeRequest,
    ) -> Result<Vec<BlobsSidecar>, ReqRespError>;
}
