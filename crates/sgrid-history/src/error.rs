//! History store error types.

use thiserror::Error;

/// Failure writing a navigation entry.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The query state could not be encoded into the entry payload.
    #[error("Failed to encode query state for grid {grid_id}")]
    Encode {
        grid_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The navigation backend refused the write (e.g. payload quota).
    #[error("Navigation backend rejected the entry: {reason}")]
    Rejected { reason: String },
}

/// Result type alias for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
