//! Error taxonomy of the content tree state machine.

use content_tree_types::LocationPath;
use thiserror::Error;

use crate::loader::LoadError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ContentTreeError {
    /// No loaded item sits at the given path. Callers treat this as a no-op.
    #[error("no loaded item at path {path}")]
    NotFound { path: LocationPath },
    /// The persisted subtree could not be used; recovered by regenerating it.
    #[error("persisted subtree is unusable: {0}")]
    MalformedPersistedState(String),
    #[error("failed to fetch locations: {0}")]
    Fetch(#[from] LoadError),
    #[error("failed to persist subtree: {0}")]
    Storage(#[from] StoreError),
    #[error("failed to serialize subtree: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ContentTreeError {
    /// Whether the event was simply ignored rather than failing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
