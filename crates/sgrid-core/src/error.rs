//! Grid controller error types.

use sgrid_history::HistoryError;
use sgrid_model::{FetchError, ModelError};
use thiserror::Error;

/// Errors surfaced to the host page.
#[derive(Debug, Error)]
pub enum GridError {
    /// The grid cannot render with the configuration it was given.
    #[error("Invalid grid configuration: {0}")]
    Configuration(String),

    /// Column declarations are inconsistent.
    #[error(transparent)]
    Columns(#[from] ModelError),

    /// A fetch callback failed. The previously displayed page is untouched.
    #[error("Failed to load page: {0}")]
    Fetch(#[from] FetchError),

    /// The query state could not be written to the navigation stack.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
