//! Content tree state machine.
//!
//! [`ContentTree`] keeps the loaded item tree and the persisted subtree
//! descriptors in step across expand, collapse, load-more and collapse-all
//! events. Storage and network access sit behind two ports:
//!
//! - [`KeyValueStore`]: where the serialized subtree lives
//!   ([`MemoryStore`], [`FileStore`])
//! - [`LocationLoader`]: how location data is fetched
//!   (see `content-tree-providers` for the REST implementation)

pub mod errors;
pub mod loader;
pub mod store;
mod tree;

pub use content_tree_types;
pub use errors::ContentTreeError;
pub use loader::{LoadError, LocationLoader};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use tree::{
    ContentTree, KEY_CONTENT_TREE_SUBTREE, LoadMoreRequest, TreeView, read_persisted_subtree,
    restore_subtree,
};
