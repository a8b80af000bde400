// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle helpers on top of [`kurbo::Rect`].
//!
//! Capture and culling work exclusively with axis-aligned rectangles in the
//! capture root's coordinate space. These helpers normalize the degenerate
//! cases (`kurbo::Rect::intersect` can produce rects with negative extent
//! for disjoint inputs) so callers can test emptiness uniformly.

use kurbo::Rect;

/// Returns the intersection of two rectangles, normalized so that a disjoint
/// pair produces a zero-area rectangle rather than one with negative extent.
#[must_use]
pub fn intersection(a: Rect, b: Rect) -> Rect {
    let x0 = a.x0.max(b.x0);
    let y0 = a.y0.max(b.y0);
    let x1 = a.x1.min(b.x1).max(x0);
    let y1 = a.y1.min(b.y1).max(y0);
    Rect::new(x0, y0, x1, y1)
}

/// Returns whether the rectangle has no area (zero or inverted extent, or a
/// non-finite coordinate).
#[must_use]
pub fn is_degenerate(r: Rect) -> bool {
    !r.is_finite() || r.width() <= 0.0 || r.height() <= 0.0
}

/// Returns whether `inner` lies entirely within `outer`.
#[must_use]
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Returns whether two rectangles have the same width and height.
#[must_use]
pub fn same_size(a: Rect, b: Rect) -> bool {
    a.width() == b.width() && a.height() == b.height()
}

/// Subtracts `cover` from `r`, appending the uncovered pieces to `out`.
///
/// Produces at most four rectangles (top band, bottom band, left and right
/// slivers). If the two do not overlap, `r` is appended unchanged.
pub fn subtract(r: Rect, cover: Rect, out: &mut Vec<Rect>) {
    let i = intersection(r, cover);
    if is_degenerate(i) {
        out.push(r);
        return;
    }

    if i.y0 > r.y0 {
        out.push(Rect::new(r.x0, r.y0, r.x1, i.y0));
    }
    if i.y1 < r.y1 {
        out.push(Rect::new(r.x0, i.y1, r.x1, r.y1));
    }
    if i.x0 > r.x0 {
        out.push(Rect::new(r.x0, i.y0, i.x0, i.y1));
    }
    if i.x1 < r.x1 {
        out.push(Rect::new(i.x1, i.y0, r.x1, i.y1));
    }
}
