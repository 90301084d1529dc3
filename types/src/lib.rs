//! Core domain types for the content tree.
//!
//! This crate contains pure domain types and tree algorithms with no IO, no
//! async, and minimal dependencies:
//!
//! - [`ItemNode`] and the item-tree walks ([`find_item`], [`append_subitems`])
//! - [`Subtree`] / [`SubtreeNode`], the persisted expansion descriptors
//! - [`LocationPath`], the addressing scheme shared by both trees
//! - [`TreeSettings`], [`PageSize`] and [`RestInfo`]

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
mod item;
mod path;
mod settings;
mod subtree;

pub use ids::LocationId;
pub use item::{ItemNode, append_subitems, find_item, find_item_mut};
pub use path::{LocationPath, PathParseError};
pub use settings::{PageSize, PageSizeError, RestInfo, TreeSettings};
pub use subtree::{SUBTREE_REQUEST_NODE_MEDIA_TYPE, Subtree, SubtreeEdit, SubtreeNode};
