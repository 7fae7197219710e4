pub mod reqresp;
pub mod sync;

pub use reqresp::{
    BlocksByRangeRequest, ReqRespClient, ReqRespError, BLOBS_SIDECARS_BY_RANGE_PROTOCOL_V1,
    BLOCKS_BY_RANGE_PROTOCOL_V2, MAX_REQUEST_BLOCKS,
};
pub use sync::{blocks_maybe_blobs_by_range, RangeSyncError};
