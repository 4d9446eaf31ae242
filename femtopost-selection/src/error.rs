//! Error types for femtopost-selection.

use thiserror::Error;

/// Result type for selection and aggregation.
pub type Result<T> = std::result::Result<T, Error>;

/// Selection error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Record or histogram error from the core crate.
    #[error(transparent)]
    Core(#[from] femtopost_core::Error),

    /// Cut configuration error.
    #[error(transparent)]
    Config(#[from] femtopost_config::Error),
}
