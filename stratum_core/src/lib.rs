// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live layer tree and change tracking for session-replay capture.
//!
//! `stratum_core` provides the mutable data model that a host application
//! drives and that the capture pipeline (`stratum_capture`) reads: an ordered
//! tree of rendering layers with visual properties, generational handles, and
//! per-channel change tracking.
//!
//! # Architecture
//!
//! The crate is organized around a capture loop that turns host mutations
//! into incremental replay updates:
//!
//! ```text
//!   Host application
//!       │  set_bounds / set_opacity / add_child / …
//!       ▼
//!   LayerStore ──► collect_changes() ──► LayerChangeset
//!       │                                     │
//!       ▼                                     ▼
//!   LayerSnapshot::capture()          change detection / rendering
//!   (stratum_capture)                 (stratum_capture)
//! ```
//!
//! **[`layer`]** — Struct-of-arrays layer tree with generational handles.
//! Properties (bounds, transform, opacity, background, border, masks, content)
//! are set by the host; mutations mark dirty channels automatically.
//!
//! **[`dirty`]** — Multi-channel dirty tracking via `understory_dirty`.
//! GEOMETRY and OPACITY propagate to descendants; CLIP and DISPLAY are
//! local-only; TOPOLOGY flags structural changes.
//!
//! **[`transform`]** — Column-major 4×4 transform with 2-D projection and an
//! axis-alignment predicate used by occlusion culling.
//!
//! **[`identity`]** — Replay identifiers minted lazily per live layer by a
//! swappable [`ReplayIdGenerator`](identity::ReplayIdGenerator).
//!
//! **[`time`]** — Injectable [`TimeSource`](time::TimeSource) for
//! deterministic testing of render budgets and cache eviction cadence.
//!
//! **[`context`]** / **[`telemetry`]** — The recording context (privacy
//! levels, session identifiers, capture date) and the telemetry sink trait
//! used to report unexpected internal conditions.

pub mod color;
pub mod context;
pub mod dirty;
pub mod geometry;
pub mod identity;
pub mod layer;
pub mod telemetry;
pub mod time;
pub mod transform;
