//! The content tree state machine.
//!
//! Two trees are kept side by side: the live item tree (what the view
//! renders) and the subtree descriptor tree (which nodes are expanded and how
//! many children each one requests). Every event patches the item tree from
//! a loader response, patches the descriptor tree to match, and writes the
//! whole descriptor tree back to storage.
//!
//! ```text
//! new() ── restore or generate subtree ── expand current location
//!   │
//! mount() ── preloaded items? ── yes: rebuild subtree from items, save
//!   │                         └─ no:  load_subtree() -> items
//!   ▼
//! after_item_toggle / load_more_subitems / collapse_all ── save
//! ```
//!
//! All entry points take `&mut self`, so a second event cannot start on the
//! same instance while a fetch is still in flight.

use content_tree_types::{
    ItemNode, LocationId, LocationPath, PageSize, RestInfo, Subtree, SubtreeEdit, TreeSettings,
    append_subitems, find_item,
};
use tracing::{debug, info, warn};

use crate::errors::ContentTreeError;
use crate::loader::LocationLoader;
use crate::store::KeyValueStore;

/// Storage key of the persisted subtree.
pub const KEY_CONTENT_TREE_SUBTREE: &str = "ez-content-tree-subtree";

/// A request from the view for the next page of a node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMoreRequest {
    pub parent_location_id: LocationId,
    pub offset: u32,
    pub limit: u32,
    /// Path of the parent item, from the root item down.
    pub path: LocationPath,
}

impl LoadMoreRequest {
    /// The page that follows what `item` already has loaded.
    #[must_use]
    pub fn next_page(path: LocationPath, item: &ItemNode, page: PageSize) -> Self {
        Self {
            parent_location_id: item.location_id,
            offset: u32::try_from(item.loaded_subitems_count()).unwrap_or(u32::MAX),
            limit: page.get(),
            path,
        }
    }
}

/// Everything the tree view needs to render.
#[derive(Debug, Clone, Copy)]
pub struct TreeView<'a> {
    pub items: &'a [ItemNode],
    /// Which items are expanded. Loaded children of a collapsed item stay in `items`.
    pub subtree: &'a Subtree,
    pub current_location_id: Option<LocationId>,
    pub subitems_load_limit: PageSize,
}

pub struct ContentTree<S, L> {
    settings: TreeSettings,
    rest_info: RestInfo,
    store: S,
    loader: L,
    items: Vec<ItemNode>,
    subtree: Subtree,
}

impl<S, L> ContentTree<S, L>
where
    S: KeyValueStore,
    L: LocationLoader,
{
    /// Restore the persisted subtree (or start fresh) and expand the path to
    /// the current location.
    pub fn new(settings: TreeSettings, rest_info: RestInfo, store: S, loader: L) -> Self {
        let mut subtree = restore_subtree(&store, &settings);
        let inside_root = subtree.expand_location(
            settings.root_location_id,
            &settings.current_location_path,
            settings.subitems_load_limit,
        );
        if !inside_root {
            debug!(
                root = %settings.root_location_id,
                current = %settings.current_location_path.to_slashed(),
                "Current location is outside the tree root; nothing expanded"
            );
        }

        Self {
            settings,
            rest_info,
            store,
            loader,
            items: Vec::new(),
            subtree,
        }
    }

    /// Start from already fetched items instead of loading them on mount.
    #[must_use]
    pub fn with_preloaded_locations(mut self, items: Vec<ItemNode>) -> Self {
        self.items = items;
        self
    }

    /// Populate the item tree.
    ///
    /// With preloaded items the subtree is rebuilt from them and saved.
    /// Otherwise the whole described subtree is fetched in one request.
    pub async fn mount(&mut self) -> Result<(), ContentTreeError> {
        if !self.items.is_empty() {
            self.subtree = Subtree::from_items(&self.items, self.settings.subitems_load_limit);
            self.save_subtree()?;
            info!(
                items = self.items.len(),
                "Mounted content tree from preloaded locations"
            );
            return Ok(());
        }

        self.reload_items().await?;
        info!(items = self.items.len(), "Mounted content tree");
        Ok(())
    }

    /// Fetch another page of children and record the new count.
    ///
    /// The descriptor limit becomes the exact number of loaded children.
    pub async fn load_more_subitems(
        &mut self,
        request: LoadMoreRequest,
    ) -> Result<SubtreeEdit, ContentTreeError> {
        let location = self
            .loader
            .load_location_items(
                &self.rest_info,
                request.parent_location_id,
                request.limit,
                request.offset,
            )
            .await
            .inspect_err(|e| {
                warn!(path = %request.path, "Failed to load more subitems: {e}");
            })?;

        let ids = request.path.as_slice();
        let batch = location.subitems.unwrap_or_default();
        let fetched = batch.len();
        if !append_subitems(&mut self.items, ids, batch) {
            debug!(path = %request.path, "Loaded subitems for an item that is gone");
            return Err(ContentTreeError::NotFound {
                path: request.path.clone(),
            });
        }

        let Some(item) = find_item(&self.items, ids) else {
            return Err(ContentTreeError::NotFound {
                path: request.path.clone(),
            });
        };
        let edit = self.subtree.update_item(ids, item);
        debug!(path = %request.path, fetched, ?edit, "Loaded more subitems");

        self.save_subtree()?;
        Ok(edit)
    }

    /// Record that the item at `path` was expanded or collapsed in the view.
    pub fn after_item_toggle(
        &mut self,
        path: &LocationPath,
        is_expanded: bool,
    ) -> Result<SubtreeEdit, ContentTreeError> {
        let page = self.settings.subitems_load_limit;
        let ids = path.as_slice();
        let Some(item) = find_item(&self.items, ids) else {
            debug!(%path, "Toggled item is not loaded");
            return Err(ContentTreeError::NotFound { path: path.clone() });
        };

        let edit = if is_expanded {
            self.subtree.add_item(ids, item, page)
        } else {
            self.subtree.remove_item(ids, item)
        };
        debug!(%path, expanded = is_expanded, ?edit, "Subtree updated after toggle");

        self.save_subtree()?;
        Ok(edit)
    }

    /// Drop all expansion state and reload the tree from its root.
    pub async fn collapse_all(&mut self) -> Result<(), ContentTreeError> {
        self.items.clear();
        self.subtree = Subtree::initial(
            self.settings.root_location_id,
            self.settings.subitems_load_limit,
        );
        self.save_subtree()?;
        info!("Collapsed all items");

        self.reload_items().await
    }

    #[must_use]
    pub fn view(&self) -> TreeView<'_> {
        TreeView {
            items: &self.items,
            subtree: &self.subtree,
            current_location_id: self.settings.current_location_id(),
            subitems_load_limit: self.settings.subitems_load_limit,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[ItemNode] {
        &self.items
    }

    #[must_use]
    pub fn subtree(&self) -> &Subtree {
        &self.subtree
    }

    #[must_use]
    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    async fn reload_items(&mut self) -> Result<(), ContentTreeError> {
        let loaded = self
            .loader
            .load_subtree(&self.rest_info, &self.subtree)
            .await
            .inspect_err(|e| warn!("Failed to load subtree: {e}"))?;
        self.items = loaded.into_iter().take(1).collect();
        Ok(())
    }

    fn save_subtree(&mut self) -> Result<(), ContentTreeError> {
        let blob = serde_json::to_string(&self.subtree)?;
        self.store.set(KEY_CONTENT_TREE_SUBTREE, &blob)?;
        Ok(())
    }
}

/// Read the persisted subtree, if any.
///
/// A blob that does not parse, holds no root, or was saved for a different
/// root location is reported as [`ContentTreeError::MalformedPersistedState`].
pub fn read_persisted_subtree(
    store: &impl KeyValueStore,
    root_location_id: LocationId,
) -> Result<Option<Subtree>, ContentTreeError> {
    let Some(blob) = store.get(KEY_CONTENT_TREE_SUBTREE)? else {
        return Ok(None);
    };
    let subtree: Subtree = serde_json::from_str(&blob)
        .map_err(|e| ContentTreeError::MalformedPersistedState(e.to_string()))?;

    match subtree.root() {
        None => Err(ContentTreeError::MalformedPersistedState(
            "no root descriptor".to_string(),
        )),
        Some(root) if root.location_id != root_location_id => {
            Err(ContentTreeError::MalformedPersistedState(format!(
                "saved for root {} instead of {root_location_id}",
                root.location_id
            )))
        }
        Some(_) => Ok(Some(subtree)),
    }
}

/// The persisted subtree, or a fresh one when nothing usable was saved.
pub fn restore_subtree(store: &impl KeyValueStore, settings: &TreeSettings) -> Subtree {
    match read_persisted_subtree(store, settings.root_location_id) {
        Ok(Some(subtree)) => subtree,
        Ok(None) => Subtree::initial(settings.root_location_id, settings.subitems_load_limit),
        Err(e) => {
            warn!("Discarding saved subtree, starting fresh: {e}");
            Subtree::initial(settings.root_location_id, settings.subitems_load_limit)
        }
    }
}
