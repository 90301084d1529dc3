//! Loader port: how the content tree fetches location data.

use std::future::Future;

use content_tree_types::{ItemNode, LocationId, RestInfo, Subtree};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Source of location data for the item tree.
///
/// A failed call leaves the tree untouched; nothing is retried.
pub trait LocationLoader {
    /// Fetch one page of children of `parent_location_id`.
    ///
    /// The returned node is the parent itself, with `subitems` holding the page.
    fn load_location_items(
        &self,
        rest_info: &RestInfo,
        parent_location_id: LocationId,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<ItemNode, LoadError>> + Send;

    /// Fetch everything `subtree` describes in one request.
    ///
    /// The first returned node mirrors the subtree root with item data attached.
    fn load_subtree(
        &self,
        rest_info: &RestInfo,
        subtree: &Subtree,
    ) -> impl Future<Output = Result<Vec<ItemNode>, LoadError>> + Send;
}
