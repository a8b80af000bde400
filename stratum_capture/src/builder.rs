// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick tree snapshotting with embedded-slot tracking.

use std::collections::HashSet;

use stratum_core::context::RecordingContext;
use stratum_core::layer::{LayerStore, SlotId};

use crate::snapshot::{LayerSnapshot, Semantics};

/// One capture tick's output: the snapshot tree plus capture metadata.
#[derive(Clone, Debug)]
pub struct LayerTreeSnapshot {
    /// The captured tree, rooted at the store's primary root.
    pub root: LayerSnapshot,
    /// Capture date with the context's server-time offset applied.
    pub date: f64,
    /// The context the capture ran under.
    pub context: RecordingContext,
    /// Every embedded-subsystem slot currently known to the recording,
    /// including slots whose host layer is temporarily detached from the
    /// tree.
    pub web_view_slot_ids: HashSet<SlotId>,
}

/// Builds one [`LayerTreeSnapshot`] per capture tick.
///
/// The builder is stateful for one reason: embedded-subsystem slots must
/// keep their identity across captures even when their hosting layer is
/// temporarily out of the visual hierarchy (a navigation transition detaches
/// the host without destroying the embedded instance). A slot stays tracked
/// for as long as the store's registry reports the instance alive.
#[derive(Debug, Default)]
pub struct LayerTreeSnapshotBuilder {
    known_web_slots: HashSet<SlotId>,
}

impl LayerTreeSnapshotBuilder {
    /// Creates a builder with no known slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current tree, or returns `None` when no root layer is
    /// available (for example before the host window attaches).
    ///
    /// Runs synchronously and must be called where the live tree is safe to
    /// read.
    pub fn create_snapshot(
        &mut self,
        store: &mut LayerStore,
        ctx: &RecordingContext,
    ) -> Option<LayerTreeSnapshot> {
        let root = store.primary_root()?;
        let snapshot = LayerSnapshot::capture(store, root, ctx);

        collect_slots(&snapshot, &mut self.known_web_slots);
        self.known_web_slots
            .retain(|slot| store.web_slot_alive(*slot));

        Some(LayerTreeSnapshot {
            root: snapshot,
            date: ctx.corrected_date(),
            context: ctx.clone(),
            web_view_slot_ids: self.known_web_slots.clone(),
        })
    }
}

fn collect_slots(snapshot: &LayerSnapshot, slots: &mut HashSet<SlotId>) {
    if let Semantics::WebView { slot } = snapshot.semantics {
        slots.insert(slot);
    }
    for child in &snapshot.children {
        collect_slots(child, slots);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use stratum_core::layer::LayerId;

    use super::*;

    fn store_with_root() -> (LayerStore, LayerId) {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 200.0, 300.0));
        (store, root)
    }

    #[test]
    fn returns_none_without_a_root() {
        let mut store = LayerStore::new();
        let mut builder = LayerTreeSnapshotBuilder::new();
        assert!(
            builder
                .create_snapshot(&mut store, &RecordingContext::default())
                .is_none()
        );
    }

    #[test]
    fn applies_server_time_offset_to_date() {
        let (mut store, _root) = store_with_root();
        let mut builder = LayerTreeSnapshotBuilder::new();
        let ctx = RecordingContext {
            date: 1000.0,
            server_time_offset: Some(-3.0),
            ..RecordingContext::default()
        };

        let tree = builder.create_snapshot(&mut store, &ctx).expect("has root");
        assert_eq!(tree.date, 997.0);
    }

    #[test]
    fn captures_web_slots_present_in_the_tree() {
        let (mut store, root) = store_with_root();
        let host = store.create_layer();
        store.set_bounds(host, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_web_slot(host, Some(SlotId(7)));
        store.add_child(root, host);

        let mut builder = LayerTreeSnapshotBuilder::new();
        let tree = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");

        assert!(tree.web_view_slot_ids.contains(&SlotId(7)));
    }

    #[test]
    fn keeps_slot_while_detached_host_instance_is_alive() {
        let (mut store, root) = store_with_root();
        let host = store.create_layer();
        store.set_bounds(host, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_web_slot(host, Some(SlotId(7)));
        store.add_child(root, host);

        let mut builder = LayerTreeSnapshotBuilder::new();
        let _ = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");

        // Detach the host (e.g. a navigation transition); the embedded
        // instance itself stays alive.
        store.remove_from_parent(host);

        let tree = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");
        assert!(
            tree.web_view_slot_ids.contains(&SlotId(7)),
            "slot must survive its host's temporary absence"
        );
    }

    #[test]
    fn drops_slot_once_instance_is_released() {
        let (mut store, root) = store_with_root();
        let host = store.create_layer();
        store.set_bounds(host, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_web_slot(host, Some(SlotId(7)));
        store.add_child(root, host);

        let mut builder = LayerTreeSnapshotBuilder::new();
        let _ = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");

        store.remove_from_parent(host);
        store.set_web_slot(host, None);
        store.release_web_slot(SlotId(7));

        let tree = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");
        assert!(!tree.web_view_slot_ids.contains(&SlotId(7)));
    }

    #[test]
    fn accumulates_slots_across_captures() {
        let (mut store, root) = store_with_root();
        let first_host = store.create_layer();
        store.set_bounds(first_host, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_web_slot(first_host, Some(SlotId(1)));
        store.add_child(root, first_host);

        let mut builder = LayerTreeSnapshotBuilder::new();
        let _ = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");

        store.remove_from_parent(first_host);
        let second_host = store.create_layer();
        store.set_bounds(second_host, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_web_slot(second_host, Some(SlotId(2)));
        store.add_child(root, second_host);

        let tree = builder
            .create_snapshot(&mut store, &RecordingContext::default())
            .expect("has root");
        assert!(tree.web_view_slot_ids.contains(&SlotId(1)));
        assert!(tree.web_view_slot_ids.contains(&SlotId(2)));
    }
}
