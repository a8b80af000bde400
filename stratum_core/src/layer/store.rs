// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with allocation, topology, and property
//! management.

use std::collections::HashSet;

use kurbo::{Point, Rect};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::color::Rgba;
use crate::dirty;
use crate::identity::{ReplayId, ReplayIdGenerator};
use crate::transform::Transform3d;

use super::id::{ContentId, INVALID, LayerId, SlotId};
use super::kind::LayerKind;
use super::traverse::Children;

/// Struct-of-arrays storage for all live layers.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer
/// occupies a slot in parallel arrays. Destroyed layers are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// The store is the capture pipeline's picture of the host UI: the host
/// mutates it on the UI thread, each mutation marks a dirty channel, and
/// [`collect_changes`](Self::collect_changes) drains those channels into the
/// changeset that drives change detection.
#[derive(Debug)]
pub struct LayerStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Geometry (set by the host) --
    bounds: Vec<Rect>,
    position: Vec<Point>,
    transform: Vec<Transform3d>,
    z_position: Vec<f64>,

    // -- Visual attributes (set by the host) --
    opacity: Vec<f32>,
    hidden: Vec<bool>,
    background: Vec<Option<Rgba>>,
    border_width: Vec<f64>,
    border_color: Vec<Option<Rgba>>,
    corner_radius: Vec<f64>,
    masks_to_bounds: Vec<bool>,
    mask: Vec<bool>,
    content: Vec<Option<ContentId>>,
    kind: Vec<LayerKind>,
    web_slot: Vec<Option<SlotId>>,

    // -- Replay identity --
    replay_id: Vec<Option<ReplayId>>,
    generator: ReplayIdGenerator,

    // -- Embedded-subsystem registry --
    live_web_slots: HashSet<SlotId>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    dirty: DirtyTracker<u32>,
    pub(crate) topology_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty layer store with the default autoincrementing
    /// replay-id generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(ReplayIdGenerator::autoincrementing())
    }

    /// Creates an empty layer store minting replay ids from `generator`.
    #[must_use]
    pub fn with_generator(generator: ReplayIdGenerator) -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            bounds: Vec::new(),
            position: Vec::new(),
            transform: Vec::new(),
            z_position: Vec::new(),
            opacity: Vec::new(),
            hidden: Vec::new(),
            background: Vec::new(),
            border_width: Vec::new(),
            border_color: Vec::new(),
            corner_radius: Vec::new(),
            masks_to_bounds: Vec::new(),
            mask: Vec::new(),
            content: Vec::new(),
            kind: Vec::new(),
            web_slot: Vec::new(),
            replay_id: Vec::new(),
            generator,
            live_web_slots: HashSet::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            topology_dirty: false,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new plain layer and returns its handle.
    ///
    /// The layer starts with zero bounds, an identity transform, full
    /// opacity, no background, no border, no content, and no parent.
    pub fn create_layer(&mut self) -> LayerId {
        self.create_layer_with(LayerKind::Plain)
    }

    /// Creates a new layer of the given kind and returns its handle.
    pub fn create_layer_with(&mut self, kind: LayerKind) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.bounds[i] = Rect::ZERO;
            self.position[i] = Point::ZERO;
            self.transform[i] = Transform3d::IDENTITY;
            self.z_position[i] = 0.0;
            self.opacity[i] = 1.0;
            self.hidden[i] = false;
            self.background[i] = None;
            self.border_width[i] = 0.0;
            self.border_color[i] = None;
            self.corner_radius[i] = 0.0;
            self.masks_to_bounds[i] = false;
            self.mask[i] = false;
            self.content[i] = None;
            self.kind[i] = kind;
            self.web_slot[i] = None;
            self.replay_id[i] = None;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.bounds.push(Rect::ZERO);
            self.position.push(Point::ZERO);
            self.transform.push(Transform3d::IDENTITY);
            self.z_position.push(0.0);
            self.opacity.push(1.0);
            self.hidden.push(false);
            self.background.push(None);
            self.border_width.push(0.0);
            self.border_color.push(None);
            self.corner_radius.push(0.0);
            self.masks_to_bounds.push(false);
            self.mask.push(false);
            self.content.push(None);
            self.kind.push(kind);
            self.web_slot.push(None);
            self.replay_id.push(None);
            self.generation.push(0);
            idx
        };

        self.topology_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);

        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the layer has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy layer with children"
        );

        // Remove from parent's child list if attached.
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.topology_dirty = true;
        self.pending_removed.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Returns whether the given handle refers to a live layer.
    ///
    /// This is the recoverable counterpart to the panicking accessors:
    /// snapshots hold `LayerId`s without owning the layer, and a handle whose
    /// layer was destroyed since capture answers `false` here instead of
    /// panicking downstream.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks inherited channels for `child`'s subtree so the whole subtree
    /// shows up in the next changeset under its new ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: LayerId, child: LayerId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        // Dirty dependency edges: child depends on parent for the inherited
        // channels.
        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// Marks inherited channels for `child`'s subtree so the whole subtree
    /// shows up in the next changeset after detaching from the old ancestry.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the layer has no parent.
    pub fn remove_from_parent(&mut self, child: LayerId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "layer has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::GEOMETRY);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` must not already have a parent. `sibling` must have a parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or
    /// `sibling` has no parent.
    pub fn insert_before(&mut self, child: LayerId, sibling: LayerId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        let _ = self.dirty.add_dependency(c, p, dirty::GEOMETRY);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.topology_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(LayerId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a layer, in z-order
    /// (back to front, as stored).
    #[must_use]
    pub fn children(&self, id: LayerId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns all root layers (those with no parent).
    #[must_use]
    pub fn roots(&self) -> Vec<LayerId> {
        let mut roots = Vec::new();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                roots.push(LayerId {
                    idx,
                    generation: self.generation[idx as usize],
                });
            }
        }
        roots
    }

    /// Returns the first root layer, if any.
    ///
    /// This is the capture root: the layer whose coordinate space every
    /// snapshot rectangle is expressed in.
    #[must_use]
    pub fn primary_root(&self) -> Option<LayerId> {
        self.roots().into_iter().next()
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the bounds of a layer, in its own coordinate space.
    #[must_use]
    pub fn bounds(&self, id: LayerId) -> Rect {
        self.validate(id);
        self.bounds[id.idx as usize]
    }

    /// Returns the position of the layer's anchor in its parent's space.
    #[must_use]
    pub fn position(&self, id: LayerId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Returns the local transform of a layer (applied about the bounds
    /// center).
    #[must_use]
    pub fn transform(&self, id: LayerId) -> Transform3d {
        self.validate(id);
        self.transform[id.idx as usize]
    }

    /// Returns the z-position used to order a layer among its siblings.
    #[must_use]
    pub fn z_position(&self, id: LayerId) -> f64 {
        self.validate(id);
        self.z_position[id.idx as usize]
    }

    /// Returns the opacity of a layer.
    #[must_use]
    pub fn opacity(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns whether the layer is hidden.
    #[must_use]
    pub fn is_hidden(&self, id: LayerId) -> bool {
        self.validate(id);
        self.hidden[id.idx as usize]
    }

    /// Returns the background color of a layer.
    #[must_use]
    pub fn background(&self, id: LayerId) -> Option<Rgba> {
        self.validate(id);
        self.background[id.idx as usize]
    }

    /// Returns the border width of a layer.
    #[must_use]
    pub fn border_width(&self, id: LayerId) -> f64 {
        self.validate(id);
        self.border_width[id.idx as usize]
    }

    /// Returns the border color of a layer.
    #[must_use]
    pub fn border_color(&self, id: LayerId) -> Option<Rgba> {
        self.validate(id);
        self.border_color[id.idx as usize]
    }

    /// Returns the corner radius of a layer.
    #[must_use]
    pub fn corner_radius(&self, id: LayerId) -> f64 {
        self.validate(id);
        self.corner_radius[id.idx as usize]
    }

    /// Returns whether the layer clips its children to its bounds.
    #[must_use]
    pub fn masks_to_bounds(&self, id: LayerId) -> bool {
        self.validate(id);
        self.masks_to_bounds[id.idx as usize]
    }

    /// Returns whether the layer has a mask of its own.
    #[must_use]
    pub fn has_mask(&self, id: LayerId) -> bool {
        self.validate(id);
        self.mask[id.idx as usize]
    }

    /// Returns the content buffer of a layer.
    #[must_use]
    pub fn content(&self, id: LayerId) -> Option<ContentId> {
        self.validate(id);
        self.content[id.idx as usize]
    }

    /// Returns the kind of a layer.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> LayerKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Returns the embedded slot hosted by a layer, if any.
    #[must_use]
    pub fn web_slot(&self, id: LayerId) -> Option<SlotId> {
        self.validate(id);
        self.web_slot[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the bounds of a layer.
    ///
    /// Marks the GEOMETRY channel dirty with eager propagation to
    /// descendants.
    pub fn set_bounds(&mut self, id: LayerId, bounds: Rect) {
        self.validate(id);
        self.bounds[id.idx as usize] = bounds;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the position of a layer's anchor in its parent's space.
    pub fn set_position(&mut self, id: LayerId, position: Point) {
        self.validate(id);
        self.position[id.idx as usize] = position;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the local transform of a layer.
    pub fn set_transform(&mut self, id: LayerId, transform: Transform3d) {
        self.validate(id);
        self.transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the z-position of a layer.
    pub fn set_z_position(&mut self, id: LayerId, z: f64) {
        self.validate(id);
        self.z_position[id.idx as usize] = z;
        self.dirty.mark_with(id.idx, dirty::GEOMETRY, &EagerPolicy);
    }

    /// Sets the opacity of a layer.
    ///
    /// Marks the OPACITY channel dirty with eager propagation to
    /// descendants, since every descendant's resolved opacity changes.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) {
        self.validate(id);
        self.opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets whether the layer is hidden.
    pub fn set_hidden(&mut self, id: LayerId, hidden: bool) {
        self.validate(id);
        self.hidden[id.idx as usize] = hidden;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Sets the background color of a layer.
    ///
    /// Marks the DISPLAY channel: drawn content changed.
    pub fn set_background(&mut self, id: LayerId, background: Option<Rgba>) {
        self.validate(id);
        self.background[id.idx as usize] = background;
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    /// Sets the border width of a layer.
    pub fn set_border_width(&mut self, id: LayerId, width: f64) {
        self.validate(id);
        self.border_width[id.idx as usize] = width;
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    /// Sets the border color of a layer.
    pub fn set_border_color(&mut self, id: LayerId, color: Option<Rgba>) {
        self.validate(id);
        self.border_color[id.idx as usize] = color;
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    /// Sets the corner radius of a layer.
    pub fn set_corner_radius(&mut self, id: LayerId, radius: f64) {
        self.validate(id);
        self.corner_radius[id.idx as usize] = radius;
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    /// Sets whether the layer clips its children to its bounds.
    pub fn set_masks_to_bounds(&mut self, id: LayerId, masks: bool) {
        self.validate(id);
        self.masks_to_bounds[id.idx as usize] = masks;
        self.dirty.mark(id.idx, dirty::CLIP);
    }

    /// Sets whether the layer has a mask of its own.
    pub fn set_mask(&mut self, id: LayerId, mask: bool) {
        self.validate(id);
        self.mask[id.idx as usize] = mask;
        self.dirty.mark(id.idx, dirty::CLIP);
    }

    /// Sets the content buffer of a layer.
    ///
    /// Marks the DISPLAY channel: the cached raster for the layer is stale.
    pub fn set_content(&mut self, id: LayerId, content: Option<ContentId>) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    /// Flags the layer's drawn content as invalidated without changing any
    /// property (the equivalent of a host-side "needs display").
    pub fn invalidate_display(&mut self, id: LayerId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    /// Marks the layer as hosting the given embedded slot (or none).
    ///
    /// The slot is registered as live as a side effect.
    pub fn set_web_slot(&mut self, id: LayerId, slot: Option<SlotId>) {
        self.validate(id);
        self.web_slot[id.idx as usize] = slot;
        if let Some(slot) = slot {
            self.live_web_slots.insert(slot);
        }
        self.dirty.mark(id.idx, dirty::DISPLAY);
    }

    // -- Embedded-subsystem registry --

    /// Registers an embedded subsystem instance as live.
    pub fn register_web_slot(&mut self, slot: SlotId) {
        self.live_web_slots.insert(slot);
    }

    /// Marks an embedded subsystem instance as destroyed.
    pub fn release_web_slot(&mut self, slot: SlotId) {
        self.live_web_slots.remove(&slot);
    }

    /// Returns whether the embedded subsystem instance behind `slot` is still
    /// alive, regardless of whether any layer currently hosts it.
    #[must_use]
    pub fn web_slot_alive(&self, slot: SlotId) -> bool {
        self.live_web_slots.contains(&slot)
    }

    // -- Replay identity --

    /// Returns the replay id of a layer, minting one on first access.
    ///
    /// The id is stable for the layer's lifetime; destroying the layer and
    /// reusing its slot mints a fresh id for the new layer.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn replay_id(&mut self, id: LayerId) -> ReplayId {
        self.validate(id);
        let slot = &mut self.replay_id[id.idx as usize];
        match slot {
            Some(existing) => *existing,
            None => {
                let minted = self.generator.next_id();
                *slot = Some(minted);
                minted
            }
        }
    }

    /// Runs `f` with `generator` installed as the replay-id generator,
    /// restoring the previous generator afterwards.
    ///
    /// Ids minted inside the scope come from `generator`; ids minted before
    /// the scope keep their values (minting is per-layer and memoized).
    pub fn with_replay_id_generator<R>(
        &mut self,
        generator: ReplayIdGenerator,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = core::mem::replace(&mut self.generator, generator);
        let result = f(self);
        self.generator = previous;
        result
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: LayerId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn drain_channel(&mut self, channel: understory_dirty::Channel) -> Vec<u32> {
        self.dirty.drain(channel).deterministic().run().collect()
    }

    pub(crate) fn drain_channel_affected(
        &mut self,
        channel: understory_dirty::Channel,
    ) -> Vec<u32> {
        self.dirty
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .collect()
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::GEOMETRY, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }
}
