//! femtopost-core: Core types for femtoscopy post-processing.
//!
//! This crate provides the columnar record tables of a dataset partition,
//! the decoder for compressed PID significances, and the histogram types
//! keyed by a closed set of categories and observables.
//!

pub mod category;
pub mod error;
pub mod histogram;
pub mod pid;
pub mod record;
pub mod schema;
pub mod set;

pub use category::{Bucket, EventHist, TrackHist, TrackHist2D};
pub use error::{Error, Result};
pub use histogram::{Axis, Hist1D, Hist2D};
pub use pid::{decode_nsigma, BinDecoder, PidHypothesis};
pub use record::{
    CollisionTable, PartType, ParticleDebugTable, ParticleTable, ParticleView, Partition,
    PrimaryVertex,
};
pub use schema::HistogramSchema;
pub use set::{BucketHistograms, HistogramSet};
