//! femtopost-config: Configuration documents for femtopost.
//!
//! Two JSON documents drive a run: the histogram schema (binning of every
//! event and particle histogram) and the cut set (inclusive ranges per
//! species). Both are parsed and validated completely before any row is
//! read.

mod cuts;
mod error;
mod schema;

pub use cuts::{CutRange, CutSet, Species};
pub use error::{Error, Result};
pub use schema::{load_schema, schema_from_json};
