// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-capture change collection.
//!
//! Each capture tick starts by draining the store's dirty channels into a
//! [`LayerChangeset`]: the record of which live layers had observable
//! mutations since the previous capture. Change detection downstream uses it
//! to decide which cached layer images are stale.
//!
//! Draining follows a per-channel pattern:
//!
//! 1. **GEOMETRY** / **OPACITY** — drained with affected-set expansion, so a
//!    parent mutation surfaces every descendant (their root-space rectangles
//!    and resolved opacities changed too).
//! 2. **CLIP** / **DISPLAY** — drained as-is; these are per-layer properties.
//! 3. **TOPOLOGY** — drained and discarded; structural changes are reported
//!    through [`topology_changed`](LayerChangeset::topology_changed) and the
//!    lifecycle lists.
//!
//! `LayerChangeset` uses raw slot indices (`u32`) rather than
//! [`LayerId`](super::LayerId) handles; membership queries take a handle and
//! compare by index.

use super::id::LayerId;
use super::store::LayerStore;
use crate::dirty;

/// The set of changes produced by a single
/// [`LayerStore::collect_changes`] call.
///
/// Each list contains the raw slot indices of layers that changed in the
/// corresponding category since the previous collection.
#[derive(Clone, Debug, Default)]
pub struct LayerChangeset {
    /// Layers whose root-space rectangle may have changed (own or inherited
    /// bounds/position/transform/z-position mutation).
    pub geometry: Vec<u32>,
    /// Layers whose resolved opacity or effective visibility may have
    /// changed.
    pub opacities: Vec<u32>,
    /// Layers whose mask or clipping flags changed.
    pub clips: Vec<u32>,
    /// Layers whose drawn content was invalidated. This is the aspect that
    /// forces a cached image to be re-rendered.
    pub display: Vec<u32>,
    /// Layers added since the last collection.
    pub added: Vec<u32>,
    /// Layers removed since the last collection.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed.
    pub topology_changed: bool,
}

impl LayerChangeset {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.opacities.clear();
        self.clips.clear();
        self.display.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
            && self.opacities.is_empty()
            && self.clips.is_empty()
            && self.display.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }

    /// Returns whether the layer's drawn content was invalidated.
    #[must_use]
    pub fn display_changed(&self, layer: LayerId) -> bool {
        self.display.contains(&layer.index())
    }

    /// Returns whether the layer's root-space rectangle may have changed.
    #[must_use]
    pub fn geometry_changed(&self, layer: LayerId) -> bool {
        self.geometry.contains(&layer.index())
    }
}

impl LayerStore {
    /// Drains all dirty channels, returning the set of changes since the
    /// previous collection.
    pub fn collect_changes(&mut self) -> LayerChangeset {
        let mut changes = LayerChangeset::default();
        self.collect_changes_into(&mut changes);
        changes
    }

    /// Like [`collect_changes`](Self::collect_changes), but reuses a
    /// caller-provided buffer to avoid allocation.
    pub fn collect_changes_into(&mut self, changes: &mut LayerChangeset) {
        changes.clear();

        changes.topology_changed = self.topology_dirty;
        self.topology_dirty = false;

        changes.geometry = self.drain_channel_affected(dirty::GEOMETRY);
        changes.opacities = self.drain_channel_affected(dirty::OPACITY);
        changes.clips = self.drain_channel(dirty::CLIP);
        changes.display = self.drain_channel(dirty::DISPLAY);

        // Drain TOPOLOGY (just consume, changes are structural).
        let _ = self.drain_channel(dirty::TOPOLOGY);

        // Move lifecycle lists.
        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }
}
