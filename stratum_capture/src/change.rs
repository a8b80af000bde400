// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-snapshot render change detection.
//!
//! Before rasterizing anything, the renderer asks each candidate snapshot
//! whether its cached image (if any) is still usable and, if not, which
//! rectangle to re-render. The decision combines the changeset collected
//! from the live store with a comparison of the current visible rectangle
//! against the one cached at the last render.

use std::collections::HashMap;

use kurbo::Rect;
use stratum_core::geometry;
use stratum_core::identity::ReplayId;
use stratum_core::layer::{LayerChangeset, LayerStore};
use thiserror::Error;

use crate::snapshot::LayerSnapshot;

/// Why change detection could not produce a decision for a snapshot.
///
/// Both cases are per-node and recoverable: the node is skipped for the
/// frame and the capture carries on.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ChangeError {
    /// The live layer the snapshot was taken from has been deallocated since
    /// capture.
    #[error("source layer has been destroyed since capture")]
    MissingLayer,
    /// The computed visible rectangle is empty or degenerate — nothing to
    /// draw (for example a fully clipped node).
    #[error("visible rectangle is empty or degenerate")]
    InvalidRect,
}

/// The outcome of change detection for one snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerImageChange {
    /// Whether a (re-)render is required.
    pub needs_render: bool,
    /// The rectangle to render, in root space. Always the snapshot's current
    /// visible rectangle, which may be a partial region of the layer.
    pub rect: Rect,
}

impl LayerSnapshot {
    /// Decides whether this snapshot's cached image needs regenerating.
    ///
    /// `image_rects` maps replay ids to the visible rectangle cached at the
    /// last successful render. The reuse rule is intentionally strict: a
    /// cached image is kept only when no display aspect is flagged for the
    /// live layer *and* the current visible rectangle equals the cached one
    /// exactly. Any rectangle change — growth, shrink, or translation —
    /// re-renders exactly the new visible rectangle; a pure translation is
    /// cheap for the renderer because the pixel resource can be reused.
    ///
    /// A node never rendered before needs a render only if it has own
    /// paintable content; a pure structural container never needs a raster,
    /// even on first sight.
    pub fn layer_image_change(
        &self,
        changes: &LayerChangeset,
        image_rects: &HashMap<ReplayId, Rect>,
        tree: &LayerStore,
    ) -> Result<LayerImageChange, ChangeError> {
        if !tree.is_alive(self.source) {
            return Err(ChangeError::MissingLayer);
        }

        let visible = self.visible_rect();
        if geometry::is_degenerate(visible) {
            return Err(ChangeError::InvalidRect);
        }

        let display_changed = changes.display_changed(self.source);

        let needs_render = match image_rects.get(&self.replay_id) {
            None => self.has_own_content(),
            Some(cached) => display_changed || *cached != visible,
        };

        Ok(LayerImageChange {
            needs_render,
            rect: visible,
        })
    }
}
