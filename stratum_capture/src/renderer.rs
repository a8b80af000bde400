// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Budgeted, cancellable layer-image rendering with a time-boxed cache.
//!
//! [`LayerImageRenderer`] owns the per-layer image cache and decides, for
//! each frame's candidate snapshots, what to re-rasterize, what to reuse,
//! and what to skip. One [`render_images`](LayerImageRenderer::render_images)
//! call is one frame: candidates are processed in order under a wall-clock
//! budget, and once the budget is exceeded every remaining candidate is
//! resolved as timed out rather than silently dropped.
//!
//! The cache is mutated only inside `render_images`; the renderer is
//! single-writer by construction (callers invoke it serially per pipeline).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use kurbo::Rect;
use stratum_core::geometry;
use stratum_core::identity::ReplayId;
use stratum_core::layer::{LayerChangeset, LayerId, LayerStore};
use stratum_core::time::TimeSource;
use thiserror::Error;

use crate::image::LayerImage;
use crate::raster;
use crate::snapshot::{LayerSnapshot, Semantics};

/// Why a candidate produced no image this frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LayerImageError {
    /// Rendering was attempted but failed (invalid geometry, destroyed
    /// layer). Per-candidate and recoverable.
    #[error("rendering was attempted and failed")]
    Discarded,
    /// The candidate was not reached before the time budget expired.
    /// Distinct from [`Discarded`](Self::Discarded) so telemetry can
    /// separate budget pressure from genuine failures.
    #[error("the rendering time budget expired before this layer")]
    TimedOut,
}

/// Per-candidate outcome of a [`LayerImageRenderer::render_images`] call.
pub type RenderResult = Result<Arc<LayerImage>, LayerImageError>;

/// Cache aging and eviction knobs.
#[derive(Clone, Copy, Debug)]
pub struct CachePolicy {
    /// An entry is evicted once it has gone unreferenced for more than this
    /// many frames.
    pub expiration_frame_count: u32,
    /// Eviction sweeps run every this-many `render_images` calls.
    pub eviction_interval_frame_count: u64,
    /// At most this many entries are evicted per sweep, bounding pause time
    /// under pathological cache sizes.
    pub maximum_evictions: usize,
}

impl CachePolicy {
    /// Creates a policy from the three knobs.
    #[must_use]
    pub const fn new(
        expiration_frame_count: u32,
        eviction_interval_frame_count: u64,
        maximum_evictions: usize,
    ) -> Self {
        Self {
            expiration_frame_count,
            eviction_interval_frame_count,
            maximum_evictions,
        }
    }
}

impl Default for CachePolicy {
    /// Keeps images for one minute of 1 Hz captures, sweeping every 10th
    /// frame.
    fn default() -> Self {
        Self::new(60, 10, 64)
    }
}

#[derive(Debug)]
struct CacheEntry {
    image: Arc<LayerImage>,
    /// Visible rectangle at the time of the last render or reuse.
    rect: Rect,
    /// Frames since the entry was last referenced by a candidate.
    frames_since_seen: u32,
}

/// Renders candidate snapshots into cached [`LayerImage`]s under a time
/// budget.
#[derive(Debug)]
pub struct LayerImageRenderer {
    scale: f64,
    time_source: TimeSource,
    policy: CachePolicy,
    cache: HashMap<ReplayId, CacheEntry>,
    frame_count: u64,
}

impl LayerImageRenderer {
    /// Creates a renderer with the default [`CachePolicy`].
    ///
    /// `scale` is pixels per root-space unit.
    #[must_use]
    pub fn new(scale: f64, time_source: TimeSource) -> Self {
        Self::with_cache_policy(scale, time_source, CachePolicy::default())
    }

    /// Creates a renderer with an explicit cache policy.
    #[must_use]
    pub fn with_cache_policy(scale: f64, time_source: TimeSource, policy: CachePolicy) -> Self {
        Self {
            scale,
            time_source,
            policy,
            cache: HashMap::new(),
            frame_count: 0,
        }
    }

    /// Renders (or reuses) images for this frame's candidates.
    ///
    /// Candidates are processed in input order. Web-view candidates are
    /// never rasterized here and produce no entry; candidates whose change
    /// detection says "no render needed" return the cached image with its
    /// identity preserved when one exists, and produce no entry when none
    /// does. Once the elapsed time against `timeout_interval` (seconds)
    /// exceeds the budget, every remaining candidate resolves to
    /// [`LayerImageError::TimedOut`] in a single pass.
    ///
    /// The call always returns normally; per-candidate failures are folded
    /// into the result map as [`LayerImageError`] values.
    pub async fn render_images(
        &mut self,
        candidates: &[LayerSnapshot],
        changes: &LayerChangeset,
        tree: &LayerStore,
        root: LayerId,
        timeout_interval: f64,
    ) -> HashMap<ReplayId, RenderResult> {
        self.frame_count += 1;
        let started = self.time_source.now();
        let root_alive = tree.is_alive(root);

        let cached_rects: HashMap<ReplayId, Rect> = self
            .cache
            .iter()
            .map(|(id, entry)| (*id, entry.rect))
            .collect();

        let mut results = HashMap::new();
        let mut touched: HashSet<ReplayId> = HashSet::new();
        let mut deadline_passed = false;

        for snapshot in candidates {
            if matches!(snapshot.semantics, Semantics::WebView { .. }) {
                // Embedded subsystems replay through their own stream.
                continue;
            }

            if !deadline_passed && self.time_source.now() - started > timeout_interval {
                deadline_passed = true;
                tracing::debug!(
                    budget = timeout_interval,
                    "render budget exceeded, timing out remaining candidates"
                );
            }
            if deadline_passed {
                results.insert(snapshot.replay_id, Err(LayerImageError::TimedOut));
                continue;
            }
            if !root_alive {
                results.insert(snapshot.replay_id, Err(LayerImageError::Discarded));
                continue;
            }

            if let Some(result) = self.process(snapshot, changes, tree, &cached_rects, &mut touched)
            {
                results.insert(snapshot.replay_id, result);
            }

            // Cooperative suspension point so the budget check can take
            // effect without blocking the caller's executor.
            tokio::task::yield_now().await;
        }

        self.age_cache(&touched);
        let interval = self.policy.eviction_interval_frame_count.max(1);
        if self.frame_count % interval == 0 {
            self.sweep_cache();
        }

        results
    }

    /// Handles one candidate. `None` means the candidate is filtered out of
    /// the result map entirely (nothing to draw, nothing cached).
    fn process(
        &mut self,
        snapshot: &LayerSnapshot,
        changes: &LayerChangeset,
        tree: &LayerStore,
        cached_rects: &HashMap<ReplayId, Rect>,
        touched: &mut HashSet<ReplayId>,
    ) -> Option<RenderResult> {
        let change = match snapshot.layer_image_change(changes, cached_rects, tree) {
            Ok(change) => change,
            Err(crate::change::ChangeError::MissingLayer) => {
                // The layer died between capture and render; skip it this
                // frame, keeping whatever the serializer already has.
                tracing::debug!(path = %snapshot.path, "skipping snapshot of destroyed layer");
                return None;
            }
            Err(crate::change::ChangeError::InvalidRect) => {
                return Some(Err(LayerImageError::Discarded));
            }
        };

        if !change.needs_render {
            let entry = self.cache.get_mut(&snapshot.replay_id)?;
            entry.frames_since_seen = 0;
            touched.insert(snapshot.replay_id);
            return Some(Ok(Arc::clone(&entry.image)));
        }

        // Geometry-only movement: the drawn pixels are still valid, only the
        // frame changed. Hand out a new image sharing the cached resource.
        if !changes.display_changed(snapshot.source) {
            if let Some(entry) = self.cache.get_mut(&snapshot.replay_id) {
                if geometry::same_size(entry.rect, change.rect) {
                    let image = Arc::new(LayerImage {
                        frame: change.rect,
                        resource: Arc::clone(&entry.image.resource),
                    });
                    entry.image = Arc::clone(&image);
                    entry.rect = change.rect;
                    entry.frames_since_seen = 0;
                    touched.insert(snapshot.replay_id);
                    return Some(Ok(image));
                }
            }
        }

        match raster::rasterize(tree, snapshot, change.rect, self.scale) {
            Ok(resource) => {
                let image = Arc::new(LayerImage {
                    frame: change.rect,
                    resource: Arc::new(resource),
                });
                self.cache.insert(
                    snapshot.replay_id,
                    CacheEntry {
                        image: Arc::clone(&image),
                        rect: change.rect,
                        frames_since_seen: 0,
                    },
                );
                touched.insert(snapshot.replay_id);
                Some(Ok(image))
            }
            Err(error) => {
                tracing::debug!(path = %snapshot.path, %error, "discarding layer image");
                Some(Err(LayerImageError::Discarded))
            }
        }
    }

    /// Ages every entry that was not referenced this frame.
    fn age_cache(&mut self, touched: &HashSet<ReplayId>) {
        for (id, entry) in &mut self.cache {
            if !touched.contains(id) {
                entry.frames_since_seen = entry.frames_since_seen.saturating_add(1);
            }
        }
    }

    /// Evicts expired entries, at most `maximum_evictions` per sweep.
    /// Scanning in id order keeps the truncation deterministic.
    fn sweep_cache(&mut self) {
        let mut expired: Vec<ReplayId> = self
            .cache
            .iter()
            .filter(|(_, entry)| entry.frames_since_seen > self.policy.expiration_frame_count)
            .map(|(id, _)| *id)
            .collect();
        expired.sort_unstable();
        expired.truncate(self.policy.maximum_evictions);
        for id in expired {
            self.cache.remove(&id);
        }
    }
}
