#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Identifier used when a host mounts a grid without naming it.
pub const FALLBACK_GRID_ID: &str = "default-grid";

/// Stable name of one grid instance.
///
/// Namespaces both the navigation payload and durable column storage, so two
/// grids mounted at the same time must never share one.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct GridId(String);

impl GridId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidGridId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The identifier assigned to grids mounted without one.
    pub fn fallback() -> Self {
        Self(FALLBACK_GRID_ID.to_string())
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_GRID_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for GridId {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_rejects_blank() {
        assert_eq!(GridId::new("  sales ").unwrap().as_str(), "sales");
        assert!(GridId::new("   ").is_err());
    }

    #[test]
    fn fallback_is_recognized() {
        assert!(GridId::fallback().is_fallback());
        assert!(!GridId::new("assets").unwrap().is_fallback());
    }
}
