// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-sibling occlusion culling.
//!
//! Given a flattened, back-to-front snapshot list, [`removing_obscured`]
//! drops every snapshot whose visible rectangle is fully covered by opaque
//! content drawn in front of it. Opaque rectangles are indexed into fixed
//! horizontal bands so each coverage query only inspects occluders that can
//! possibly overlap it.

use kurbo::Rect;
use stratum_core::geometry;

use crate::snapshot::LayerSnapshot;

/// Height of one horizontal band in root-space units.
///
/// A tuned constant, not an invariant: smaller bands make queries cheaper
/// and inserts more expensive.
pub const BAND_HEIGHT: f64 = 64.0;

/// Rects spanning more than this many bands go into one global bucket
/// instead of being replicated into every band they touch.
///
/// Bounds index size for call sites with very tall opaque layers (full-screen
/// backgrounds span every band) at the cost of checking the global bucket on
/// every query. A tuned constant, not an invariant.
pub const MAX_BANDS_PER_ENTRY: usize = 8;

/// Opaque rectangles accumulated front-to-back, bucketed by horizontal band.
#[derive(Debug, Default)]
struct BandIndex {
    bands: std::collections::HashMap<i64, Vec<Rect>>,
    global: Vec<Rect>,
}

impl BandIndex {
    fn band_range(rect: Rect) -> (i64, i64) {
        let lo = (rect.y0 / BAND_HEIGHT).floor() as i64;
        let hi = (rect.y1 / BAND_HEIGHT).floor() as i64;
        (lo, hi.max(lo))
    }

    fn insert(&mut self, rect: Rect) {
        let (lo, hi) = Self::band_range(rect);
        let span = (hi - lo + 1) as usize;
        if span > MAX_BANDS_PER_ENTRY {
            self.global.push(rect);
        } else {
            for band in lo..=hi {
                self.bands.entry(band).or_default().push(rect);
            }
        }
    }

    /// Returns whether `rect` is fully covered by the union of indexed
    /// rectangles.
    ///
    /// Coverage is computed by subtracting candidate occluders from the
    /// query rect until nothing remains. A rect indexed into several bands
    /// may be subtracted more than once; repeat subtraction is a no-op.
    fn covers(&self, rect: Rect) -> bool {
        let mut remaining = vec![rect];
        let mut scratch = Vec::new();

        let (lo, hi) = Self::band_range(rect);
        let band_candidates = (lo..=hi)
            .filter_map(|band| self.bands.get(&band))
            .flatten();

        for occluder in self.global.iter().chain(band_candidates) {
            scratch.clear();
            for piece in remaining.drain(..) {
                geometry::subtract(piece, *occluder, &mut scratch);
            }
            core::mem::swap(&mut remaining, &mut scratch);
            if remaining.is_empty() {
                return true;
            }
        }
        false
    }
}

/// Returns the subsequence of `snapshots` not fully covered by fully-opaque
/// content drawn later (closer to the front) in the list, preserving the
/// original relative order.
///
/// `snapshots` must be in back-to-front order, as produced by
/// [`LayerSnapshot::flattened`]. `viewport` bounds what counts as visible at
/// all; a snapshot whose `frame ∩ clip ∩ viewport` is empty is dropped
/// outright.
#[must_use]
pub fn removing_obscured(snapshots: Vec<LayerSnapshot>, viewport: Rect) -> Vec<LayerSnapshot> {
    let mut keep = vec![false; snapshots.len()];
    let mut occluders = BandIndex::default();

    // Walk front-to-back so each snapshot only tests rectangles that are
    // drawn on top of it.
    for (i, snapshot) in snapshots.iter().enumerate().rev() {
        let visible = geometry::intersection(snapshot.visible_rect(), viewport);
        if geometry::is_degenerate(visible) {
            continue;
        }
        if occluders.covers(visible) {
            continue;
        }
        keep[i] = true;
        if snapshot.is_opaque() {
            occluders.insert(visible);
        }
    }

    snapshots
        .into_iter()
        .zip(keep)
        .filter_map(|(snapshot, kept)| kept.then_some(snapshot))
        .collect()
}
