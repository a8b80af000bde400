// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The layer store uses multi-channel dirty tracking (via
//! [`understory_dirty`]) to record which live layers mutated between
//! captures. Each channel represents an independent category of change and
//! maps onto one list of
//! [`LayerChangeset`](crate::layer::LayerChangeset).
//!
//! # Propagation semantics
//!
//! Channels differ in whether dirtiness propagates to descendants:
//!
//! - **Propagating** — [`GEOMETRY`] and [`OPACITY`] use
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and have dependency
//!   edges from child to parent. Moving or fading a parent changes every
//!   descendant's root-space rectangle and resolved opacity, so the whole
//!   subtree must appear in the changeset for change detection to notice.
//!   (Hidden-flag changes are routed through [`OPACITY`]; both feed the
//!   same visibility computations downstream.)
//!
//! - **Local-only** — [`CLIP`] and [`DISPLAY`] are marked with the default
//!   policy. Mask/clip flags and drawn-content invalidation are per-layer
//!   properties; [`DISPLAY`] is the "display aspect" that forces a cached
//!   image to be re-rendered regardless of rectangle containment.
//!
//! - **Structural** — [`TOPOLOGY`] is marked on topology mutations
//!   (add/remove child, create/destroy layer).
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each
//! [`LayerStore::collect_changes`](crate::layer::LayerStore::collect_changes)
//! call drains all channels into a
//! [`LayerChangeset`](crate::layer::LayerChangeset), which the capture
//! pipeline consumes for change detection.

use understory_dirty::Channel;

/// Bounds, position, transform, or z-position changed — every descendant's
/// root-space rectangle is affected.
pub const GEOMETRY: Channel = Channel::new(0);

/// Opacity or hidden flag changed — every descendant's resolved opacity or
/// effective visibility is affected.
pub const OPACITY: Channel = Channel::new(1);

/// Mask or clipping flag changed — no propagation needed.
pub const CLIP: Channel = Channel::new(2);

/// Drawn content invalidated (content buffer, background, border, corner
/// radius) — forces re-rasterization of the layer's cached image.
pub const DISPLAY: Channel = Channel::new(3);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(4);
