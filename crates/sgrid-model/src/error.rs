use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid grid identifier: {0:?}")]
    InvalidGridId(String),
    #[error("column key must not be empty (label: {0:?})")]
    EmptyColumnKey(String),
    #[error("duplicate column key: {0}")]
    DuplicateColumnKey(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Failure reported by a host fetch callback.
///
/// The grid never inspects the cause; it only forwards it to the host after
/// the loading indicator has been cleared.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
