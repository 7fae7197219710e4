pub mod blob;
pub mod block;
pub mod block_input;
pub mod checkpoint;
pub mod config;
pub mod fork;
pub mod proto_block;
pub mod slot;
pub mod state;
pub mod types;

pub use blob::{Blob, BlobsSidecar};
pub use block::{BeaconBlock, BeaconBlockBody, SignedBeaconBlock};
pub use block_input::BlockInput;
pub use checkpoint::Checkpoint;
pub use config::{
    ChainConfig, ConfigError, FAR_FUTURE_EPOCH, MIN_EPOCHS_FOR_BLOB_SIDECARS_REQUESTS,
    SLOTS_PER_EPOCH,
};
pub use fork::ForkName;
pub use proto_block::ProtoBlock;
pub use slot::{Epoch, Slot};
pub use state::{ChainState, StateIndices};
pub use types::{Bytes32, KzgCommitment, KzgProof, Root, Signature, ValidatorIndex};
