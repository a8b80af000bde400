// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree flattening into a render/serialization order.

use core::cmp::Ordering;

use crate::snapshot::LayerSnapshot;

impl LayerSnapshot {
    /// Serializes the tree into an ordered sequence of content-bearing nodes.
    ///
    /// Within each branch the parent precedes its children; siblings are
    /// ordered by ascending `z_position` with the original sibling order
    /// preserved for ties. Pure structural containers are excluded, but
    /// their children still appear at the position the container would have
    /// occupied. Web-view nodes are emitted as leaves (they have no children
    /// by construction). Emitted nodes carry no children.
    #[must_use]
    pub fn flattened(&self) -> Vec<Self> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Self>) {
        if self.has_own_content() {
            out.push(self.leaf_clone());
        }

        let mut ordered: Vec<&Self> = self.children.iter().collect();
        // Stable sort: equal z keeps insertion order.
        ordered.sort_by(|a, b| {
            a.z_position
                .partial_cmp(&b.z_position)
                .unwrap_or(Ordering::Equal)
        });
        for child in ordered {
            child.flatten_into(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use stratum_core::color::Rgba;
    use stratum_core::context::RecordingContext;
    use stratum_core::identity::ReplayId;
    use stratum_core::layer::{ContentId, LayerId, LayerStore, SlotId};

    use crate::snapshot::Semantics;

    use super::*;

    fn ctx() -> RecordingContext {
        RecordingContext::default()
    }

    fn content_child(store: &mut LayerStore, parent: LayerId) -> LayerId {
        let child = store.create_layer();
        store.set_bounds(child, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_content(child, Some(ContentId(1)));
        store.add_child(parent, child);
        child
    }

    #[test]
    fn leaves_flatten_one_to_one() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_background(root, Some(Rgba::WHITE));
        let a = content_child(&mut store, root);
        let b = content_child(&mut store, root);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let flat = snapshot.flattened();

        assert_eq!(flat.len(), 3, "root + two leaves");
        assert!(flat.iter().all(|n| n.children.is_empty()));
        assert!(flat[0].is_snapshot_of(root));
        assert!(flat[1].is_snapshot_of(a));
        assert!(flat[2].is_snapshot_of(b));
    }

    #[test]
    fn equal_z_positions_keep_insertion_order() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));

        // z-positions [0, 1, 0, 1] must flatten to original indices
        // [0, 2, 1, 3].
        let mut children = Vec::new();
        for z in [0.0, 1.0, 0.0, 1.0] {
            let child = content_child(&mut store, root);
            store.set_z_position(child, z);
            children.push(child);
        }

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let flat = snapshot.flattened();

        assert_eq!(flat.len(), 4, "root is a pure container and is excluded");
        assert!(flat[0].is_snapshot_of(children[0]));
        assert!(flat[1].is_snapshot_of(children[2]));
        assert!(flat[2].is_snapshot_of(children[1]));
        assert!(flat[3].is_snapshot_of(children[3]));
    }

    #[test]
    fn containers_are_elided_but_children_remain_in_place() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_background(root, Some(Rgba::WHITE));

        let before = content_child(&mut store, root);
        let container = store.create_layer();
        store.set_bounds(container, Rect::new(0.0, 0.0, 50.0, 50.0));
        store.add_child(root, container);
        let inside = content_child(&mut store, container);
        let after = content_child(&mut store, root);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let flat = snapshot.flattened();

        let order: Vec<LayerId> = flat.iter().map(|n| n.source).collect();
        assert_eq!(order, vec![root, before, inside, after]);
    }

    #[test]
    fn parent_precedes_children_within_a_branch() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_background(root, Some(Rgba::WHITE));
        let branch = content_child(&mut store, root);
        let leaf = content_child(&mut store, branch);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let flat = snapshot.flattened();

        let order: Vec<LayerId> = flat.iter().map(|n| n.source).collect();
        assert_eq!(order, vec![root, branch, leaf]);
    }

    #[test]
    fn web_view_is_emitted_as_leaf() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let web_host = store.create_layer();
        store.set_bounds(web_host, Rect::new(0.0, 0.0, 50.0, 50.0));
        store.set_web_slot(web_host, Some(SlotId(9)));
        store.add_child(root, web_host);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let flat = snapshot.flattened();

        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].semantics, Semantics::WebView { slot: SlotId(9) });
        assert!(flat[0].children.is_empty());
    }

    #[test]
    fn negative_z_sorts_behind_siblings() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));

        let front = content_child(&mut store, root);
        let back = content_child(&mut store, root);
        store.set_z_position(back, -1.0);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let flat = snapshot.flattened();

        assert!(flat[0].is_snapshot_of(back));
        assert!(flat[1].is_snapshot_of(front));
    }

    #[test]
    fn flatten_does_not_renumber_replay_ids() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        let child = content_child(&mut store, root);

        let snapshot = LayerSnapshot::capture(&mut store, root, &ctx());
        let expected: ReplayId = store.replay_id(child);
        let flat = snapshot.flattened();

        assert_eq!(flat[0].replay_id, expected);
    }
}
