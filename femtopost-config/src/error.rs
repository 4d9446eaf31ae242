//! Configuration error types.

use crate::cuts::Species;
use thiserror::Error;

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or missing top-level entry.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A histogram required by the engine is not configured.
    #[error("histogram {group}/{name} is not configured")]
    MissingHistogram { group: &'static str, name: &'static str },

    /// The configuration names a histogram the engine does not fill.
    #[error("unknown histogram {group}/{name}")]
    UnknownHistogram { group: &'static str, name: String },

    /// A configured histogram has unusable binning.
    #[error("histogram {group}/{name}: {source}")]
    InvalidHistogram {
        group: &'static str,
        name: &'static str,
        #[source]
        source: femtopost_core::Error,
    },

    /// A cut required by a species selection is not configured.
    #[error("cut {species}/{name} is not configured")]
    MissingCut { species: Species, name: String },
}
