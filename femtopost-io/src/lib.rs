//! femtopost-io: Dataset readers and histogram sinks for femtopost.
//!
//! Partitions are read through the [`DatasetSource`] trait and the merged
//! histograms are written through the [`HistogramSink`] trait. JSON
//! documents are memory-mapped via memmap2; HDF5 support is behind the
//! `hdf5` feature.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod json;
mod reader;
mod sink;
mod source;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use crate::hdf5::{read_hdf5_histograms, write_hdf5_dataset, Hdf5Dataset, Hdf5HistogramSink};
pub use json::{read_json_histograms, write_json_dataset, JsonDataset, JsonHistogramSink};
pub use reader::MappedFileReader;
pub use sink::{
    stored_groups, HistogramSink, StoredAxis, StoredGroups, StoredHistogram, EVENT_GROUP,
};
pub use source::{
    is_partition_name, DatasetSource, MemoryDataset, COLLISION_TABLE, DEBUG_TABLE,
    PARTICLE_TABLE, PARTITION_PREFIX,
};
