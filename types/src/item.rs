//! The live item tree: content nodes as loaded from the repository.

use serde::{Deserialize, Serialize};

use crate::LocationId;

/// A loaded content node.
///
/// `subitems` is `None` when the node's children were never fetched; both
/// `None` and an empty collection render as a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemNode {
    pub location_id: LocationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_identifier: Option<String>,
    #[serde(default)]
    pub is_container: bool,
    #[serde(default)]
    pub is_invisible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_subitems_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subitems: Option<Vec<ItemNode>>,
}

impl ItemNode {
    #[must_use]
    pub fn new(location_id: LocationId) -> Self {
        Self {
            location_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subitems(mut self, subitems: Vec<ItemNode>) -> Self {
        self.subitems = Some(subitems);
        self
    }

    #[must_use]
    pub fn subitems(&self) -> &[ItemNode] {
        self.subitems.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn loaded_subitems_count(&self) -> usize {
        self.subitems().len()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.subitems().is_empty()
    }

    /// Whether the repository reports more children than are loaded.
    #[must_use]
    pub fn has_more_subitems(&self) -> bool {
        self.total_subitems_count
            .is_some_and(|total| total as usize > self.loaded_subitems_count())
    }
}

/// Find the item addressed by `path`, starting at `items`.
///
/// The first path segment is matched against `items` itself. An unmatched
/// segment, or an intermediate node without a `subitems` collection, yields
/// `None`. The terminal node is returned whether or not it has children.
#[must_use]
pub fn find_item<'a>(items: &'a [ItemNode], path: &[LocationId]) -> Option<&'a ItemNode> {
    let (last, ancestors) = path.split_last()?;
    let mut level = items;
    for id in ancestors {
        let item = level.iter().find(|item| item.location_id == *id)?;
        level = item.subitems.as_deref()?;
    }
    level.iter().find(|item| item.location_id == *last)
}

pub fn find_item_mut<'a>(
    items: &'a mut [ItemNode],
    path: &[LocationId],
) -> Option<&'a mut ItemNode> {
    let (last, ancestors) = path.split_last()?;
    let mut level = items;
    for id in ancestors {
        let item = level.iter_mut().find(|item| item.location_id == *id)?;
        level = item.subitems.as_deref_mut()?;
    }
    level.iter_mut().find(|item| item.location_id == *last)
}

/// Append a freshly fetched batch to the children of the item at `path`.
///
/// No deduplication happens: the caller picks an offset/limit window that
/// does not overlap what is already loaded. Returns `false` when `path`
/// does not resolve.
pub fn append_subitems(items: &mut [ItemNode], path: &[LocationId], batch: Vec<ItemNode>) -> bool {
    let Some(item) = find_item_mut(items, path) else {
        return false;
    };
    item.subitems.get_or_insert_with(Vec::new).extend(batch);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> LocationId {
        LocationId::new(raw)
    }

    fn leaf(raw: u64) -> ItemNode {
        ItemNode::new(id(raw))
    }

    fn sample() -> Vec<ItemNode> {
        vec![ItemNode::new(id(2)).with_subitems(vec![
            ItemNode::new(id(43)).with_subitems(vec![leaf(52), leaf(53)]),
            leaf(44),
        ])]
    }

    #[test]
    fn finds_nested_item() {
        let items = sample();
        let found = find_item(&items, &[id(2), id(43), id(53)]).unwrap();
        assert_eq!(found.location_id, id(53));
    }

    #[test]
    fn terminal_segment_may_be_a_leaf_without_collection() {
        let items = sample();
        let found = find_item(&items, &[id(2), id(44)]).unwrap();
        assert!(found.subitems.is_none());
    }

    #[test]
    fn intermediate_node_without_collection_is_a_miss() {
        let items = sample();
        assert!(find_item(&items, &[id(2), id(44), id(99)]).is_none());
    }

    #[test]
    fn unmatched_segment_or_empty_path_is_a_miss() {
        let items = sample();
        assert!(find_item(&items, &[id(2), id(99)]).is_none());
        assert!(find_item(&items, &[id(3)]).is_none());
        assert!(find_item(&items, &[]).is_none());
    }

    #[test]
    fn append_keeps_existing_children_first() {
        let mut items = sample();
        let appended = append_subitems(&mut items, &[id(2), id(43)], vec![leaf(54), leaf(52)]);
        assert!(appended);

        let ids: Vec<u64> = find_item(&items, &[id(2), id(43)])
            .unwrap()
            .subitems()
            .iter()
            .map(|item| item.location_id.value())
            .collect();
        assert_eq!(ids, vec![52, 53, 54, 52]);
    }

    #[test]
    fn append_creates_missing_collection() {
        let mut items = sample();
        assert!(append_subitems(&mut items, &[id(2), id(44)], vec![leaf(60)]));
        assert_eq!(
            find_item(&items, &[id(2), id(44)])
                .unwrap()
                .loaded_subitems_count(),
            1
        );
    }

    #[test]
    fn append_to_missing_path_changes_nothing() {
        let mut items = sample();
        let before = items.clone();
        assert!(!append_subitems(&mut items, &[id(2), id(99)], vec![leaf(60)]));
        assert_eq!(items, before);
    }

    #[test]
    fn has_more_subitems_compares_against_total() {
        let mut item = ItemNode::new(id(43)).with_subitems(vec![leaf(52)]);
        assert!(!item.has_more_subitems());
        item.total_subitems_count = Some(3);
        assert!(item.has_more_subitems());
    }
}
