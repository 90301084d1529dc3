//! Subtree descriptors: the persisted shadow of the item tree.
//!
//! A descriptor node says "this location is expanded; request up to `limit`
//! children starting at `offset`; these are its expanded descendants". The
//! whole tree doubles as the body of a load-subtree request, which is why
//! each node carries the request-node media type when serialized.
//!
//! Invariants maintained by the operations here:
//! - at most one descriptor per location under a given parent;
//! - leaves of the item tree never get a descriptor from [`Subtree::from_items`];
//! - every walk is iterative and addressed by path, never by shared reference.

use serde::de::{Deserializer, IgnoredAny};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::{ItemNode, LocationId, LocationPath, PageSize};

pub const SUBTREE_REQUEST_NODE_MEDIA_TYPE: &str =
    "application/vnd.ez.api.ContentTreeLoadSubtreeRequestNode";

/// Serializes as the request-node media type; any stored value is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RequestNodeMediaType;

impl Serialize for RequestNodeMediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(SUBTREE_REQUEST_NODE_MEDIA_TYPE)
    }
}

impl<'de> Deserialize<'de> for RequestNodeMediaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtreeNode {
    #[serde(rename = "_media-type", default)]
    media_type: RequestNodeMediaType,
    pub location_id: LocationId,
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub children: Vec<SubtreeNode>,
}

impl SubtreeNode {
    #[must_use]
    pub fn new(location_id: LocationId, limit: u32) -> Self {
        Self {
            media_type: RequestNodeMediaType,
            location_id,
            limit,
            offset: 0,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<SubtreeNode>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn child(&self, location_id: LocationId) -> Option<&SubtreeNode> {
        self.children
            .iter()
            .find(|child| child.location_id == location_id)
    }

    fn child_index(&self, location_id: LocationId) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.location_id == location_id)
    }
}

/// Result of a descriptor mutation. Anything but `Applied` left the tree as it was.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeEdit {
    Applied,
    /// The path has no addressable parent descriptor.
    ParentNotFound,
    /// The parent exists but holds no descriptor for the item.
    EntryNotFound,
    /// The item already has a descriptor under its parent.
    AlreadyPresent,
}

impl SubtreeEdit {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The descriptor tree. Serialized as a JSON array whose first element is
/// the root location's descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subtree(Vec<SubtreeNode>);

impl Subtree {
    #[must_use]
    pub fn new(nodes: Vec<SubtreeNode>) -> Self {
        Self(nodes)
    }

    /// A fresh tree holding only the root, with one page of children requested.
    #[must_use]
    pub fn initial(root_location_id: LocationId, page: PageSize) -> Self {
        Self(vec![SubtreeNode::new(root_location_id, page.get())])
    }

    /// Build descriptors for an already loaded item tree.
    ///
    /// Leaves produce nothing; every other item gets a descriptor whose limit
    /// covers its loaded children, rounded up to a whole page.
    #[must_use]
    pub fn from_items(items: &[ItemNode], page: PageSize) -> Self {
        Self(build_nodes(items, page))
    }

    #[must_use]
    pub fn nodes(&self) -> &[SubtreeNode] {
        &self.0
    }

    #[must_use]
    pub fn root(&self) -> Option<&SubtreeNode> {
        self.0.first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Make sure every id in `ids` has a descriptor, descending from the root.
    ///
    /// Missing descriptors are created with one page requested. Running this
    /// twice with the same ids leaves the tree as after the first run.
    pub fn expand_path(&mut self, ids: &[LocationId], page: PageSize) {
        let Some(mut node) = self.0.first_mut() else {
            return;
        };
        for &id in ids {
            let index = match node.child_index(id) {
                Some(index) => index,
                None => {
                    node.children.push(SubtreeNode::new(id, page.get()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index];
        }
    }

    /// Expand the part of `current_path` that lies below `root_location_id`.
    ///
    /// Returns `false`, leaving the tree untouched, when the viewed content
    /// lies outside the managed root.
    pub fn expand_location(
        &mut self,
        root_location_id: LocationId,
        current_path: &LocationPath,
        page: PageSize,
    ) -> bool {
        let Some(below_root) = current_path.after(root_location_id) else {
            return false;
        };
        self.expand_path(below_root, page);
        true
    }

    /// Descriptor of the parent of the item addressed by `path`.
    ///
    /// `path` runs from the root item to the target. The first and last
    /// segments are skipped and the ids in between are walked from the root
    /// descriptor. Paths shorter than two segments have no parent.
    pub fn find_parent_mut(&mut self, path: &[LocationId]) -> Option<&mut SubtreeNode> {
        if path.len() < 2 {
            return None;
        }
        let mut node = self.0.first_mut()?;
        for &id in &path[1..path.len() - 1] {
            node = node
                .children
                .iter_mut()
                .find(|child| child.location_id == id)?;
        }
        Some(node)
    }

    #[must_use]
    pub fn find_parent(&self, path: &[LocationId]) -> Option<&SubtreeNode> {
        if path.len() < 2 {
            return None;
        }
        let mut node = self.0.first()?;
        for &id in &path[1..path.len() - 1] {
            node = node.child(id)?;
        }
        Some(node)
    }

    /// Record `item` as expanded.
    pub fn add_item(&mut self, path: &[LocationId], item: &ItemNode, page: PageSize) -> SubtreeEdit {
        let Some(parent) = self.find_parent_mut(path) else {
            return SubtreeEdit::ParentNotFound;
        };
        if parent.child_index(item.location_id).is_some() {
            return SubtreeEdit::AlreadyPresent;
        }
        parent.children.push(SubtreeNode::new(
            item.location_id,
            page.round_up(item.loaded_subitems_count()),
        ));
        SubtreeEdit::Applied
    }

    /// Forget that `item` was expanded, together with its expanded descendants.
    pub fn remove_item(&mut self, path: &[LocationId], item: &ItemNode) -> SubtreeEdit {
        let Some(parent) = self.find_parent_mut(path) else {
            return SubtreeEdit::ParentNotFound;
        };
        let Some(index) = parent.child_index(item.location_id) else {
            return SubtreeEdit::EntryNotFound;
        };
        parent.children.remove(index);
        SubtreeEdit::Applied
    }

    /// Sync the limit of `item`'s descriptor after more children were loaded.
    ///
    /// The limit becomes the exact loaded count, not a page multiple.
    pub fn update_item(&mut self, path: &[LocationId], item: &ItemNode) -> SubtreeEdit {
        let Some(parent) = self.find_parent_mut(path) else {
            return SubtreeEdit::ParentNotFound;
        };
        let Some(index) = parent.child_index(item.location_id) else {
            return SubtreeEdit::EntryNotFound;
        };
        parent.children[index].limit =
            u32::try_from(item.loaded_subitems_count()).unwrap_or(u32::MAX);
        SubtreeEdit::Applied
    }
}

fn build_nodes(items: &[ItemNode], page: PageSize) -> Vec<SubtreeNode> {
    items
        .iter()
        .filter(|item| !item.is_leaf())
        .map(|item| {
            SubtreeNode::new(item.location_id, page.round_up(item.loaded_subitems_count()))
                .with_children(build_nodes(item.subitems(), page))
        })
        .collect()
}
