//! Plain-text rendering of the item tree.
//!
//! ```text
//! - Home [2]
//!   + Articles [43]
//!   - Media [51] (10/25)
//!       Logo [60] *
//! ```
//!
//! `-` marks an expanded item, `+` a collapsed container and `*` the current
//! location. `(loaded/total)` follows an expanded item with more children to load.

use std::fmt::Write;

use content_tree_core::TreeView;
use content_tree_core::content_tree_types::{ItemNode, LocationId, SubtreeNode};

const INDENT: &str = "  ";

#[must_use]
pub fn render(view: &TreeView<'_>) -> String {
    let mut out = String::new();
    for item in view.items {
        let descriptor = view
            .subtree
            .nodes()
            .iter()
            .find(|node| node.location_id == item.location_id);
        render_item(&mut out, item, descriptor, 0, view.current_location_id);
    }
    out
}

fn render_item(
    out: &mut String,
    item: &ItemNode,
    descriptor: Option<&SubtreeNode>,
    depth: usize,
    current: Option<LocationId>,
) {
    let expanded = descriptor.filter(|_| !item.is_leaf());
    let marker = match expanded {
        Some(_) => '-',
        None if item.is_container || !item.is_leaf() => '+',
        None => ' ',
    };

    let _ = write!(
        out,
        "{}{marker} {} [{}]",
        INDENT.repeat(depth),
        item.name,
        item.location_id
    );
    if expanded.is_some()
        && let Some(total) = item.total_subitems_count.filter(|_| item.has_more_subitems())
    {
        let _ = write!(out, " ({}/{total})", item.loaded_subitems_count());
    }
    if item.is_invisible {
        out.push_str(" (hidden)");
    }
    if current == Some(item.location_id) {
        out.push_str(" *");
    }
    out.push('\n');

    let Some(node) = expanded else { return };
    for child in item.subitems() {
        render_item(
            out,
            child,
            node.child(child.location_id),
            depth + 1,
            current,
        );
    }
}
