// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invisible-branch pruning.

use stratum_core::geometry;

use crate::snapshot::LayerSnapshot;

impl LayerSnapshot {
    /// Returns the same tree with invisible branches removed, or `None` if
    /// this node itself is invisible or becomes an empty container after
    /// pruning.
    ///
    /// A node is invisible when it is hidden, its own opacity is zero, its
    /// frame has no area, or it has no visible intersection with its own
    /// clip rect. Children are pruned first; a structural container (no own
    /// renderable content) that ends up with zero surviving children is
    /// dropped with them. A node with own content survives childless.
    #[must_use]
    pub fn removing_invisible(self) -> Option<Self> {
        if self.is_hidden || self.opacity == 0.0 || geometry::is_degenerate(self.frame) {
            return None;
        }
        if geometry::is_degenerate(self.visible_rect()) {
            return None;
        }

        let mut node = self;
        node.children = node
            .children
            .into_iter()
            .filter_map(Self::removing_invisible)
            .collect();

        if node.children.is_empty() && !node.has_own_content() {
            return None;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use stratum_core::color::Rgba;
    use stratum_core::context::RecordingContext;
    use stratum_core::layer::{ContentId, LayerStore};

    use super::*;

    fn ctx() -> RecordingContext {
        RecordingContext::default()
    }

    /// A root with a background so the container itself always survives.
    fn visible_root(store: &mut LayerStore) -> stratum_core::layer::LayerId {
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 400.0, 300.0));
        store.set_background(root, Some(Rgba::WHITE));
        root
    }

    #[test]
    fn hidden_node_is_removed() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        let child = store.create_layer();
        store.set_bounds(child, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_content(child, Some(ContentId(1)));
        store.set_hidden(child, true);
        store.add_child(root, child);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert!(pruned.children.is_empty());
    }

    #[test]
    fn zero_opacity_node_is_removed() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        let child = store.create_layer();
        store.set_bounds(child, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_content(child, Some(ContentId(1)));
        store.set_opacity(child, 0.0);
        store.add_child(root, child);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert!(pruned.children.is_empty());
    }

    #[test]
    fn translucent_node_survives() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        let child = store.create_layer();
        store.set_bounds(child, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_content(child, Some(ContentId(1)));
        store.set_opacity(child, 0.01);
        store.add_child(root, child);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert_eq!(pruned.children.len(), 1);
    }

    #[test]
    fn zero_area_node_is_removed() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        let child = store.create_layer();
        store.set_content(child, Some(ContentId(1)));
        // Default bounds are zero-sized.
        store.add_child(root, child);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert!(pruned.children.is_empty());
    }

    #[test]
    fn fully_clipped_node_is_removed() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        store.set_masks_to_bounds(root, true);
        let child = store.create_layer();
        store.set_bounds(child, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_position(child, kurbo::Point::new(1000.0, 1000.0));
        store.set_content(child, Some(ContentId(1)));
        store.add_child(root, child);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert!(pruned.children.is_empty());
    }

    #[test]
    fn empty_container_is_dropped_with_its_children() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        let container = store.create_layer();
        store.set_bounds(container, Rect::new(0.0, 0.0, 100.0, 100.0));
        let hidden_leaf = store.create_layer();
        store.set_bounds(hidden_leaf, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_content(hidden_leaf, Some(ContentId(1)));
        store.set_hidden(hidden_leaf, true);
        store.add_child(root, container);
        store.add_child(container, hidden_leaf);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert!(pruned.children.is_empty(), "container with no survivors must go");
    }

    #[test]
    fn container_with_surviving_child_is_kept() {
        let mut store = LayerStore::new();
        let root = visible_root(&mut store);
        let container = store.create_layer();
        store.set_bounds(container, Rect::new(0.0, 0.0, 100.0, 100.0));
        let leaf = store.create_layer();
        store.set_bounds(leaf, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_content(leaf, Some(ContentId(1)));
        store.add_child(root, container);
        store.add_child(container, leaf);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let pruned = snapshot.removing_invisible().expect("root is visible");

        assert_eq!(pruned.children.len(), 1);
        assert_eq!(pruned.children[0].children.len(), 1);
    }

    #[test]
    fn content_node_survives_without_children() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_background(layer, Some(Rgba::rgb(0.5, 0.5, 0.5)));

        let snapshot = LayerSnapshot::capture(&mut store, layer, &ctx());
        assert!(snapshot.removing_invisible().is_some());
    }

    #[test]
    fn bordered_node_survives_without_children() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_border_width(layer, 1.0);
        store.set_border_color(layer, Some(Rgba::BLACK));

        let snapshot = LayerSnapshot::capture(&mut store, layer, &ctx());
        assert!(snapshot.removing_invisible().is_some());
    }

    #[test]
    fn bare_invisible_root_prunes_to_none() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 100.0, 100.0));

        let snapshot = LayerSnapshot::capture(&mut store, layer, &ctx());
        assert!(snapshot.removing_invisible().is_none());
    }
}
