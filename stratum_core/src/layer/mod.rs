// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live layer tree data model.
//!
//! A *layer* is a node in the host application's rendering tree. Each layer
//! has:
//!
//! - An identity ([`LayerId`]) — a generational handle that becomes stale
//!   when the layer is destroyed. Snapshots keep these handles as non-owning
//!   references back to their source layers.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree; sibling order is the back-to-front z-order before any
//!   `z_position` sorting.
//! - Geometry — `bounds` in the layer's own space, an anchor `position` in
//!   the parent's space, a local [`Transform3d`](crate::transform::Transform3d)
//!   applied about the bounds center, and a `z_position`.
//! - Visual attributes — opacity, hidden flag, background, border, corner
//!   radius, clipping and mask flags, an opaque content-buffer handle, a
//!   [`LayerKind`] tag, and optionally an embedded-subsystem [`SlotId`].
//!
//! Layers are stored in struct-of-arrays layout with index-based handles for
//! cache-friendly traversal.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)). Draining the channels with
//! [`LayerStore::collect_changes`] yields the [`LayerChangeset`] consumed by
//! the capture pipeline's change detection.

mod changes;
mod id;
mod kind;
mod store;
mod traverse;

pub use changes::LayerChangeset;
pub use id::{ContentId, INVALID, LayerId, SlotId};
pub use kind::LayerKind;
pub use store::LayerStore;
pub use traverse::Children;
