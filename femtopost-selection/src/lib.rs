//! femtopost-selection: Selection and aggregation engine.
//!
//! This crate turns validated partitions into histograms:
//! - **Cuts** - one declarative rule list per species, one evaluator
//! - **Deduplication** - event histograms filled once per collision
//! - **Layout** - rows grouped into tracks and V0 decay triplets
//! - **Filling** - derived observables deposited into a bucket
//! - **Pipeline** - the per-partition scan and the parallel merge
//!

mod cuts;
mod dedup;
pub mod derived;
mod error;
mod filler;
mod layout;
mod pipeline;
#[cfg(test)]
mod testing;

pub use cuts::{CutRule, CutSpec, EventCut, Observable, SelectionCuts};
pub use dedup::EventDeduplicator;
pub use error::{Error, Result};
pub use filler::TrackObservables;
pub use layout::{RowEntry, RowLayout, TripletPolicy};
pub use pipeline::{
    PartitionOutput, PartitionStatistics, Pipeline, PipelineConfig, RunOutput, RunSummary,
};
