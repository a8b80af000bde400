// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-call-per-tick capture pipeline.
//!
//! [`ReplayPipeline`] wires the capture stages together in the order the
//! data flows: collect the changeset, snapshot the tree, prune invisible
//! branches, flatten, cull obscured nodes against the root viewport, then
//! render. The output pairs the culled snapshot sequence with the image map;
//! a wireframe/record serializer consumes both downstream.

use std::collections::HashMap;

use stratum_core::context::RecordingContext;
use stratum_core::identity::ReplayId;
use stratum_core::layer::LayerStore;

use crate::builder::{LayerTreeSnapshot, LayerTreeSnapshotBuilder};
use crate::occlusion::removing_obscured;
use crate::renderer::{LayerImageRenderer, RenderResult};
use crate::snapshot::LayerSnapshot;

/// Everything one capture tick produces for the serializer.
#[derive(Debug)]
pub struct CaptureOutput {
    /// The full tree snapshot with capture metadata and tracked web slots.
    pub tree: LayerTreeSnapshot,
    /// The flattened, culled, back-to-front snapshot sequence.
    pub snapshots: Vec<LayerSnapshot>,
    /// Rendered/reused images (or per-candidate errors), keyed by replay id.
    pub images: HashMap<ReplayId, RenderResult>,
}

/// Composes builder and renderer into a single per-tick entry point.
#[derive(Debug)]
pub struct ReplayPipeline {
    builder: LayerTreeSnapshotBuilder,
    renderer: LayerImageRenderer,
    timeout_interval: f64,
}

impl ReplayPipeline {
    /// Creates a pipeline rendering under the given per-tick time budget
    /// (seconds).
    #[must_use]
    pub fn new(renderer: LayerImageRenderer, timeout_interval: f64) -> Self {
        Self {
            builder: LayerTreeSnapshotBuilder::new(),
            renderer,
            timeout_interval,
        }
    }

    /// Runs one capture tick, or returns `None` when no root layer exists.
    ///
    /// The snapshot/prune/cull stages are synchronous reads of the live
    /// tree; only rendering suspends.
    pub async fn capture_frame(
        &mut self,
        store: &mut LayerStore,
        ctx: &RecordingContext,
    ) -> Option<CaptureOutput> {
        let changes = store.collect_changes();
        let tree = self.builder.create_snapshot(store, ctx)?;
        let root = store.primary_root()?;
        let viewport = tree.root.frame;

        let snapshots = match tree.root.clone().removing_invisible() {
            Some(visible) => removing_obscured(visible.flattened(), viewport),
            None => Vec::new(),
        };
        tracing::debug!(
            candidates = snapshots.len(),
            changed = !changes.is_empty(),
            "capture tick"
        );

        let images = self
            .renderer
            .render_images(&snapshots, &changes, store, root, self.timeout_interval)
            .await;

        Some(CaptureOutput {
            tree,
            snapshots,
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};
    use stratum_core::color::Rgba;
    use stratum_core::layer::ContentId;
    use stratum_core::time::TimeSource;

    use crate::renderer::LayerImageError;

    use super::*;

    fn pipeline() -> ReplayPipeline {
        ReplayPipeline::new(LayerImageRenderer::new(1.0, TimeSource::constant(0.0)), 1.0)
    }

    #[tokio::test]
    async fn empty_store_produces_no_output() {
        let mut store = LayerStore::new();
        let output = pipeline()
            .capture_frame(&mut store, &RecordingContext::default())
            .await;
        assert!(output.is_none());
    }

    #[tokio::test]
    async fn end_to_end_capture_produces_culled_snapshots_and_images() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 200.0, 300.0));
        store.set_background(root, Some(Rgba::WHITE));

        // A visible content layer.
        let visible = store.create_layer();
        store.set_bounds(visible, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_position(visible, Point::new(50.0, 50.0));
        store.set_content(visible, Some(ContentId(1)));
        store.add_child(root, visible);

        // A hidden layer that must be pruned.
        let hidden = store.create_layer();
        store.set_bounds(hidden, Rect::new(0.0, 0.0, 50.0, 50.0));
        store.set_content(hidden, Some(ContentId(2)));
        store.set_hidden(hidden, true);
        store.add_child(root, hidden);

        // An opaque cover hiding the content layer entirely.
        let cover = store.create_layer();
        store.set_bounds(cover, Rect::new(0.0, 0.0, 200.0, 300.0));
        store.set_position(cover, Point::new(100.0, 150.0));
        store.set_background(cover, Some(Rgba::BLACK));
        store.add_child(root, cover);

        let mut pipeline = pipeline();
        let output = pipeline
            .capture_frame(&mut store, &RecordingContext::default())
            .await
            .expect("root exists");

        // Only the opaque cover survives: the root and the content layer
        // are fully covered, the hidden layer was pruned.
        assert_eq!(output.snapshots.len(), 1);
        assert!(output.snapshots[0].is_snapshot_of(cover));

        let result = output
            .images
            .get(&output.snapshots[0].replay_id)
            .expect("cover must have an image entry");
        assert!(result.is_ok(), "got {result:?}");
    }

    #[tokio::test]
    async fn second_frame_reuses_cached_images() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 200.0, 300.0));
        store.set_background(root, Some(Rgba::WHITE));

        let mut pipeline = pipeline();
        let ctx = RecordingContext::default();

        let first = pipeline
            .capture_frame(&mut store, &ctx)
            .await
            .expect("root exists");
        let second = pipeline
            .capture_frame(&mut store, &ctx)
            .await
            .expect("root exists");

        let root_replay = first.snapshots[0].replay_id;
        let first_image = first.images[&root_replay].clone().expect("rendered");
        let second_image = second.images[&root_replay].clone().expect("reused");
        assert!(
            std::sync::Arc::ptr_eq(&first_image, &second_image),
            "unchanged frame must reuse the cached image"
        );
    }

    #[tokio::test]
    async fn zero_budget_times_out_all_candidates() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        store.set_bounds(root, Rect::new(0.0, 0.0, 200.0, 300.0));
        store.set_background(root, Some(Rgba::WHITE));

        let renderer =
            LayerImageRenderer::new(1.0, TimeSource::sequence([0.0, 1.0]));
        let mut pipeline = ReplayPipeline::new(renderer, 0.5);

        let output = pipeline
            .capture_frame(&mut store, &RecordingContext::default())
            .await
            .expect("root exists");

        assert_eq!(output.snapshots.len(), 1);
        let result = &output.images[&output.snapshots[0].replay_id];
        assert_eq!(result, &Err(LayerImageError::TimedOut));
    }
}
