//! Partitioned dataset access.

use crate::{Error, Result};
use femtopost_core::Partition;

/// Name prefix of partition directories.
pub const PARTITION_PREFIX: &str = "DF_";
/// Event table of a partition.
pub const COLLISION_TABLE: &str = "O2femtodreamcols";
/// Particle table of a partition.
pub const PARTICLE_TABLE: &str = "O2femtodreamparts";
/// Particle debug table of a partition.
pub const DEBUG_TABLE: &str = "O2femtodebugparts";

/// True if `name` denotes a partition.
#[must_use]
pub fn is_partition_name(name: &str) -> bool {
    name.starts_with(PARTITION_PREFIX)
}

/// A dataset made of independent partitions.
///
/// Implementations are shared across worker threads while partitions load.
pub trait DatasetSource: Sync {
    /// Names of the partitions, in dataset order.
    ///
    /// # Errors
    /// Returns an error if the dataset cannot be enumerated.
    fn partition_names(&self) -> Result<Vec<String>>;

    /// Loads one partition.
    ///
    /// Returns `Ok(None)` if the partition lacks one of its three tables.
    ///
    /// # Errors
    /// Returns an error if the partition does not exist, cannot be read, or
    /// its tables are inconsistent.
    fn load_partition(&self, name: &str) -> Result<Option<Partition>>;
}

/// Partitions held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    partitions: Vec<Partition>,
}

impl MemoryDataset {
    #[must_use]
    pub fn new(partitions: Vec<Partition>) -> Self {
        Self { partitions }
    }

    pub fn push(&mut self, partition: Partition) {
        self.partitions.push(partition);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl DatasetSource for MemoryDataset {
    fn partition_names(&self) -> Result<Vec<String>> {
        Ok(self
            .partitions
            .iter()
            .map(|p| p.name().to_string())
            .filter(|name| is_partition_name(name))
            .collect())
    }

    fn load_partition(&self, name: &str) -> Result<Option<Partition>> {
        self.partitions
            .iter()
            .find(|p| p.name() == name)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::UnknownPartition(name.to_string()))
    }
}

pub(crate) fn missing_table(partition: &str, table: &str) {
    log::warn!("{partition}: table {table} is missing, skipping partition");
}
