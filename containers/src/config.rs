use crate::fork::ForkName;
use crate::slot::{Epoch, Slot};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Slots per epoch; fixed across all forks handled here.
pub const SLOTS_PER_EPOCH: u64 = 32;

/// Trailing epoch window within which peers are expected to still serve
/// blob sidecars. Older sidecars are pruned and must not be requested.
pub const MIN_EPOCHS_FOR_BLOB_SIDECARS_REQUESTS: u64 = 4096;

/// Activation epoch for forks that are not scheduled.
pub const FAR_FUTURE_EPOCH: Epoch = Epoch(u64::MAX);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Chain configuration: genesis time, the fork activation schedule, and the
/// blob retention window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ChainConfig {
    pub genesis_time: u64,
    pub altair_fork_epoch: Epoch,
    pub bellatrix_fork_epoch: Epoch,
    pub capella_fork_epoch: Epoch,
    pub deneb_fork_epoch: Epoch,
    pub min_epochs_for_blob_sidecars_requests: u64,
}

impl Default for ChainConfig {
    /// Mainnet schedule.
    fn default() -> Self {
        Self {
            genesis_time: 1_606_824_023,
            altair_fork_epoch: Epoch(74_240),
            bellatrix_fork_epoch: Epoch(144_896),
            capella_fork_epoch: Epoch(194_048),
            deneb_fork_epoch: Epoch(269_568),
            min_epochs_for_blob_sidecars_requests: MIN_EPOCHS_FOR_BLOB_SIDECARS_REQUESTS,
        }
    }
}

impl ChainConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Fork active at the given epoch, resolved against the schedule from
    /// newest to oldest.
    pub fn fork_at_epoch(&self, epoch: Epoch) -> ForkName {
        if epoch >= self.deneb_fork_epoch {
            ForkName::Deneb
        } else if epoch >= self.capella_fork_epoch {
            ForkName::Capella
        } else if epoch >= self.bellatrix_fork_epoch {
            ForkName::Bellatrix
        } else if epoch >= self.altair_fork_epoch {
            ForkName::Altair
        } else {
            ForkName::Phase0
        }
    }

    pub fn fork_at_slot(&self, slot: Slot) -> ForkName {
        self.fork_at_epoch(slot.epoch())
    }
}
