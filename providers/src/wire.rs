//! Wire formats of the content tree REST endpoints.
//!
//! The repository describes nodes with `children` / `totalChildrenCount`;
//! the item tree calls them `subitems` / `total_subitems_count`. The mapping
//! happens here so nothing else sees the wire names.

use content_tree_types::{ItemNode, LocationId, Subtree};
use serde::{Deserialize, Serialize};

pub(crate) const LOAD_SUBTREE_REQUEST_MEDIA_TYPE: &str =
    "application/vnd.ez.api.ContentTreeLoadSubtreeRequest";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentTreeNode {
    pub location_id: LocationId,
    #[serde(default)]
    pub content_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content_type_identifier: Option<String>,
    #[serde(default)]
    pub is_container: bool,
    #[serde(default)]
    pub is_invisible: bool,
    // `displayLimit` is a view hint and is dropped here.
    #[serde(default)]
    pub total_children_count: Option<u32>,
    #[serde(default)]
    pub children: Vec<ContentTreeNode>,
}

impl From<ContentTreeNode> for ItemNode {
    fn from(node: ContentTreeNode) -> Self {
        ItemNode {
            location_id: node.location_id,
            content_id: node.content_id,
            name: node.name,
            content_type_identifier: node.content_type_identifier,
            is_container: node.is_container,
            is_invisible: node.is_invisible,
            total_subitems_count: node.total_children_count,
            subitems: Some(node.children.into_iter().map(ItemNode::from).collect()),
        }
    }
}

/// `{"ContentTreeNode": {...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct LoadSubitemsResponse {
    #[serde(rename = "ContentTreeNode")]
    pub node: ContentTreeNode,
}

/// `{"ContentTreeRoot": {"ContentTreeNodeList": [...]}}`
#[derive(Debug, Deserialize)]
pub(crate) struct LoadSubtreeResponse {
    #[serde(rename = "ContentTreeRoot")]
    pub root: ContentTreeRoot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentTreeRoot {
    #[serde(rename = "ContentTreeNodeList", default)]
    pub nodes: Vec<ContentTreeNode>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoadSubtreeRequestBody<'a> {
    #[serde(rename = "LoadSubtreeRequest")]
    pub request: LoadSubtreeRequest<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoadSubtreeRequest<'a> {
    #[serde(rename = "_media-type")]
    pub media_type: &'static str,
    pub nodes: &'a Subtree,
}

impl<'a> LoadSubtreeRequestBody<'a> {
    pub fn new(subtree: &'a Subtree) -> Self {
        Self {
            request: LoadSubtreeRequest {
                media_type: LOAD_SUBTREE_REQUEST_MEDIA_TYPE,
                nodes: subtree,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_tree_types::PageSize;

    #[test]
    fn maps_children_to_subitems() {
        let json = serde_json::json!({
            "ContentTreeNode": {
                "locationId": 43,
                "contentId": 41,
                "name": "Articles",
                "contentTypeIdentifier": "folder",
                "isContainer": true,
                "isInvisible": false,
                "displayLimit": 10,
                "totalChildrenCount": 25,
                "children": [
                    { "locationId": 52, "name": "First", "totalChildrenCount": 0, "children": [] }
                ]
            }
        });

        let response: LoadSubitemsResponse = serde_json::from_value(json).unwrap();
        let item = ItemNode::from(response.node);

        assert_eq!(item.location_id, LocationId::new(43));
        assert_eq!(item.name, "Articles");
        assert_eq!(item.total_subitems_count, Some(25));
        assert!(item.is_container);
        assert_eq!(item.subitems().len(), 1);
        assert_eq!(item.subitems()[0].name, "First");
        assert!(item.subitems()[0].is_leaf());
    }

    #[test]
    fn request_body_wraps_subtree_nodes() {
        let subtree = Subtree::initial(LocationId::new(2), PageSize::default());

        let body = serde_json::to_value(LoadSubtreeRequestBody::new(&subtree)).unwrap();

        assert_eq!(
            body["LoadSubtreeRequest"]["_media-type"],
            LOAD_SUBTREE_REQUEST_MEDIA_TYPE
        );
        assert_eq!(body["LoadSubtreeRequest"]["nodes"][0]["locationId"], 2);
        assert_eq!(body["LoadSubtreeRequest"]["nodes"][0]["limit"], 10);
    }
}
