// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable layer snapshots.
//!
//! A [`LayerSnapshot`] captures everything visually relevant about one live
//! layer at one instant, with geometry normalized into the capture root's
//! coordinate space and inherited attributes (clip, resolved opacity, mask)
//! resolved during the same single traversal. Snapshots are values: they are
//! built fresh every capture tick, never mutated, and hold only a non-owning
//! [`LayerId`] back-reference to their source layer.

use std::collections::HashMap;

use kurbo::Rect;
use stratum_core::color::Rgba;
use stratum_core::context::RecordingContext;
use stratum_core::geometry;
use stratum_core::identity::ReplayId;
use stratum_core::layer::{LayerId, LayerKind, LayerStore, SlotId};
use stratum_core::telemetry::TelemetryMessage;
use stratum_core::transform::Transform3d;

/// What a snapshot node represents beyond ordinary layer content.
///
/// The set of embedded-subsystem kinds may grow; consumers outside this
/// crate should treat unknown variants as [`Generic`](Self::Generic) by
/// matching with a default arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Semantics {
    /// An ordinary layer.
    Generic,
    /// The layer hosts an embedded web rendering subsystem. Its subtree is
    /// never captured; downstream replay splices the slot's own stream in.
    WebView {
        /// Stable identifier of the embedded instance.
        slot: SlotId,
    },
}

/// An immutable capture of one live layer's visual state plus its children.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSnapshot {
    /// Stable replay identifier of the source layer.
    pub replay_id: ReplayId,
    /// Debuggable tree path, e.g. `"Layer#0/TextLayer#1"`. Sibling indices
    /// count per kind, not globally.
    pub path: String,
    /// Non-owning reference to the source layer.
    pub source: LayerId,
    /// The layer's rectangle in the capture root's coordinate space.
    pub frame: Rect,
    /// Intersection of all ancestor clip rects, in root space.
    pub clip_rect: Rect,
    /// Sibling ordering key.
    pub z_position: f64,
    /// Whether the accumulated transform keeps rectangles axis-aligned.
    pub is_axis_aligned: bool,
    /// The layer's own opacity.
    pub opacity: f32,
    /// Own opacity multiplied by every ancestor's opacity.
    pub resolved_opacity: f32,
    /// Whether the layer is hidden.
    pub is_hidden: bool,
    /// Background fill, if any.
    pub background_color: Option<Rgba>,
    /// Whether the layer's platform content buffer is non-empty.
    pub has_contents: bool,
    /// Corner rounding radius.
    pub corner_radius: f64,
    /// Border stroke width.
    pub border_width: f64,
    /// Border stroke color, if any.
    pub border_color: Option<Rgba>,
    /// Whether the layer clips its children to its bounds.
    pub masks_to_bounds: bool,
    /// Whether this layer or any ancestor carries a mask.
    pub has_mask: bool,
    /// Kind tag of the source layer.
    pub kind: LayerKind,
    /// Embedded-subsystem classification.
    pub semantics: Semantics,
    /// Child snapshots, in the source tree's sibling order (back to front,
    /// before any z-position sorting).
    pub children: Vec<LayerSnapshot>,
}

/// Attributes accumulated down the tree during one capture pass.
struct Inherited {
    /// Maps the node's local coordinates into the capture root's space.
    to_root: Transform3d,
    /// Product of all ancestor opacities.
    resolved_opacity: f32,
    /// Clip inherited from ancestors; `None` only at the capture root,
    /// whose clip is its own frame.
    clip: Option<Rect>,
    has_mask: bool,
    axis_aligned: bool,
}

impl LayerSnapshot {
    /// Captures the subtree rooted at `root` in one synchronous pass.
    ///
    /// Children are visited in their stored sibling order; every node's
    /// frame and clip are converted into `root`'s coordinate space during
    /// the walk. Fresh replay ids are minted for layers that never had one,
    /// children before parents.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale; capture runs where the live tree is owned,
    /// so a dead root is a caller bug rather than a recoverable race.
    pub fn capture(store: &mut LayerStore, root: LayerId, ctx: &RecordingContext) -> Self {
        let inherited = Inherited {
            to_root: Transform3d::IDENTITY,
            resolved_opacity: 1.0,
            clip: None,
            has_mask: false,
            axis_aligned: true,
        };
        Self::build(store, root, &inherited, "", 0, ctx)
    }

    fn build(
        store: &mut LayerStore,
        id: LayerId,
        inherited: &Inherited,
        parent_path: &str,
        sibling_index: usize,
        ctx: &RecordingContext,
    ) -> Self {
        let kind = store.kind(id);
        let path = if parent_path.is_empty() {
            format!("{}#{sibling_index}", kind.name())
        } else {
            format!("{parent_path}/{}#{sibling_index}", kind.name())
        };

        let mut frame = inherited.to_root.map_rect_2d(store.bounds(id));
        if !frame.is_finite() {
            ctx.telemetry.send(TelemetryMessage::Error {
                message: format!("non-finite frame while capturing {path}"),
            });
            frame = Rect::ZERO;
        }
        let clip_rect = inherited.clip.unwrap_or(frame);
        let is_axis_aligned = inherited.axis_aligned && store.transform(id).is_axis_aligned();
        let resolved_opacity = inherited.resolved_opacity * store.opacity(id);
        let has_mask = inherited.has_mask || store.has_mask(id);
        let semantics = match store.web_slot(id) {
            Some(slot) => Semantics::WebView { slot },
            None => Semantics::Generic,
        };

        let children = if matches!(semantics, Semantics::WebView { .. }) {
            // The embedded subsystem records itself; its native sublayers
            // are implementation detail and never walked.
            Vec::new()
        } else {
            let child_ids: Vec<LayerId> = store.children(id).collect();
            let child_clip = if store.masks_to_bounds(id) {
                geometry::intersection(clip_rect, frame)
            } else {
                clip_rect
            };
            let mut kind_counters: HashMap<LayerKind, usize> = HashMap::new();
            let mut children = Vec::with_capacity(child_ids.len());
            for child in child_ids {
                let child_index = {
                    let counter = kind_counters.entry(store.kind(child)).or_insert(0);
                    let index = *counter;
                    *counter += 1;
                    index
                };
                let child_inherited = Inherited {
                    to_root: inherited.to_root * local_to_parent(store, child),
                    resolved_opacity,
                    clip: Some(child_clip),
                    has_mask,
                    axis_aligned: is_axis_aligned,
                };
                children.push(Self::build(
                    store,
                    child,
                    &child_inherited,
                    &path,
                    child_index,
                    ctx,
                ));
            }
            children
        };

        // Minted after the children so that first-time ids are assigned
        // leaf-first, matching the order downstream diffing expects.
        let replay_id = store.replay_id(id);

        Self {
            replay_id,
            path,
            source: id,
            frame,
            clip_rect,
            z_position: store.z_position(id),
            is_axis_aligned,
            opacity: store.opacity(id),
            resolved_opacity,
            is_hidden: store.is_hidden(id),
            background_color: store.background(id),
            has_contents: store.content(id).is_some(),
            corner_radius: store.corner_radius(id),
            border_width: store.border_width(id),
            border_color: store.border_color(id),
            masks_to_bounds: store.masks_to_bounds(id),
            has_mask,
            kind,
            semantics,
            children,
        }
    }

    /// Returns whether this snapshot was taken from `layer`.
    #[must_use]
    pub fn is_snapshot_of(&self, layer: LayerId) -> bool {
        self.source == layer
    }

    /// Returns whether the node renders anything of its own: a content
    /// buffer, a content-drawing kind, a visible background or border, or an
    /// embedded web view.
    ///
    /// Nodes without own content are structural containers; they exist only
    /// to position their children.
    #[must_use]
    pub fn has_own_content(&self) -> bool {
        matches!(self.semantics, Semantics::WebView { .. })
            || self.has_contents
            || self.kind.draws_content()
            || self.background_color.is_some_and(Rgba::is_visible)
            || (self.border_width > 0.0 && self.border_color.is_some_and(Rgba::is_visible))
    }

    /// Returns whether the node fully occludes everything behind its frame.
    ///
    /// Requires own and resolved opacity of exactly `1.0`, a background with
    /// alpha exactly `1.0`, no corner rounding, no mask anywhere in the
    /// ancestor chain, and an axis-aligned accumulated transform. Any
    /// rotation, mask, rounding, or translucency anywhere disqualifies the
    /// node from occluding others.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.opacity == 1.0
            && self.resolved_opacity == 1.0
            && self.background_color.is_some_and(Rgba::is_opaque)
            && self.corner_radius == 0.0
            && !self.has_mask
            && self.is_axis_aligned
    }

    /// Returns the rectangle the node can actually paint into: its frame
    /// intersected with its clip.
    #[must_use]
    pub fn visible_rect(&self) -> Rect {
        geometry::intersection(self.frame, self.clip_rect)
    }

    /// Copies this node without its children.
    pub(crate) fn leaf_clone(&self) -> Self {
        Self {
            replay_id: self.replay_id,
            path: self.path.clone(),
            source: self.source,
            frame: self.frame,
            clip_rect: self.clip_rect,
            z_position: self.z_position,
            is_axis_aligned: self.is_axis_aligned,
            opacity: self.opacity,
            resolved_opacity: self.resolved_opacity,
            is_hidden: self.is_hidden,
            background_color: self.background_color,
            has_contents: self.has_contents,
            corner_radius: self.corner_radius,
            border_width: self.border_width,
            border_color: self.border_color,
            masks_to_bounds: self.masks_to_bounds,
            has_mask: self.has_mask,
            kind: self.kind,
            semantics: self.semantics,
            children: Vec::new(),
        }
    }
}

/// The transform from a layer's local space into its parent's space: the
/// local transform applied about the bounds center, then translated to the
/// anchor position.
fn local_to_parent(store: &LayerStore, id: LayerId) -> Transform3d {
    let bounds = store.bounds(id);
    let position = store.position(id);
    let anchor = bounds.center();
    Transform3d::from_translation(position.x, position.y, 0.0)
        * store.transform(id)
        * Transform3d::from_translation(-anchor.x, -anchor.y, 0.0)
}
