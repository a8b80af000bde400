// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot capture, occlusion culling, and incremental image rendering for
//! session replay.
//!
//! `stratum_capture` turns a live [`LayerStore`](stratum_core::layer::LayerStore)
//! into the per-frame artifacts a replay serializer consumes: a flattened,
//! culled sequence of immutable [`LayerSnapshot`]s plus a map of rendered
//! layer images.
//!
//! # Pipeline
//!
//! Data flows strictly downward per capture tick:
//!
//! ```text
//!   LayerStore::collect_changes() ──────────────────┐
//!                                                   │
//!   LayerTreeSnapshotBuilder::create_snapshot()     │
//!       │                                           │
//!       ▼                                           │
//!   LayerSnapshot tree                              │
//!       │ removing_invisible()                      │
//!       │ flattened()                               │
//!       │ removing_obscured()                       ▼
//!       ▼                                    LayerChangeset
//!   candidate list ──► LayerImageRenderer::render_images() ──► image map
//! ```
//!
//! Capture is synchronous and runs where the live tree is safe to read;
//! rendering is asynchronous, budgeted by a wall-clock timeout, and yields
//! cooperatively between candidates.
//!
//! **[`snapshot`]** — The immutable [`LayerSnapshot`] tree and its one-pass
//! construction (coordinate normalization, clip/opacity/mask propagation,
//! per-kind path indices, embedded-web-view semantics).
//!
//! **[`visibility`]** / **[`flatten`]** / **[`occlusion`]** — Pure transforms
//! over snapshot trees: invisible-branch pruning, stable z-order
//! serialization, and banded occlusion culling.
//!
//! **[`change`]** — Per-snapshot decision of whether a cached raster is
//! stale and what rectangle to re-render.
//!
//! **[`renderer`]** — The budgeted, cancellable [`LayerImageRenderer`] and
//! its time-boxed eviction cache.
//!
//! **[`builder`]** — One-call-per-tick tree snapshotting with persistent
//! embedded-slot tracking.
//!
//! **[`pipeline`]** — Glues the stages above into a single
//! [`ReplayPipeline::capture_frame`](pipeline::ReplayPipeline::capture_frame)
//! call.
//!
//! [`LayerSnapshot`]: snapshot::LayerSnapshot
//! [`LayerImageRenderer`]: renderer::LayerImageRenderer

pub mod builder;
pub mod change;
pub mod flatten;
pub mod image;
pub mod occlusion;
pub mod pipeline;
mod raster;
pub mod renderer;
pub mod snapshot;
pub mod visibility;

pub use builder::{LayerTreeSnapshot, LayerTreeSnapshotBuilder};
pub use change::{ChangeError, LayerImageChange};
pub use image::{ImageResource, LayerImage};
pub use occlusion::removing_obscured;
pub use renderer::{CachePolicy, LayerImageError, LayerImageRenderer, RenderResult};
pub use snapshot::{LayerSnapshot, Semantics};
