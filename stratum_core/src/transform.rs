// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! This type covers the subset of 3-D transforms that capture actually needs
//! (identity, multiply, 2-D projection, axis-alignment classification)
//! without pulling in a full linear-algebra crate. The memory layout matches
//! GPU APIs and Core Animation's `CATransform3D`, so host integrations can
//! copy platform matrices in directly.

use core::ops::Mul;

use kurbo::{Point, Rect};

/// Tolerance for classifying near-zero matrix entries.
///
/// `cos(π/2)` computed in floating point is on the order of `1e-17`, so a
/// 90° rotation only classifies as axis-aligned under a small tolerance.
const AXIS_EPSILON: f64 = 1e-6;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Projects a point on the `z = 0` plane through this transform.
    ///
    /// Applies the perspective divide when the transform carries a
    /// perspective row, so points from transforms like Core Animation's
    /// `m34`-based camera setups land where the platform would place them.
    /// Returns non-finite coordinates when `w` projects to zero.
    #[must_use]
    pub fn map_point_2d(&self, p: Point) -> Point {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w == 1.0 {
            Point::new(x, y)
        } else {
            Point::new(x / w, y / w)
        }
    }

    /// Maps a rectangle on the `z = 0` plane to the bounding box of its four
    /// projected corners.
    #[must_use]
    pub fn map_rect_2d(&self, r: Rect) -> Rect {
        let corners = [
            self.map_point_2d(Point::new(r.x0, r.y0)),
            self.map_point_2d(Point::new(r.x1, r.y0)),
            self.map_point_2d(Point::new(r.x0, r.y1)),
            self.map_point_2d(Point::new(r.x1, r.y1)),
        ];
        let mut x0 = f64::INFINITY;
        let mut y0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = f64::NEG_INFINITY;
        for p in corners {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::new(x0, y0, x1, y1)
    }

    /// Returns whether a rectangle on the `z = 0` plane stays an axis-aligned
    /// rectangle under this transform.
    ///
    /// True for the identity, translations, scales, and rotations by
    /// multiples of 90°. Any other rotation, shear, or perspective
    /// contribution (a non-zero `w` row entry for `x`/`y`) disqualifies the
    /// transform.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        let c = &self.cols;
        let no_perspective = c[0][3].abs() < AXIS_EPSILON
            && c[1][3].abs() < AXIS_EPSILON
            && (c[3][3] - 1.0).abs() < AXIS_EPSILON;
        if !no_perspective {
            return false;
        }
        // 2-D linear part: either the diagonal or the anti-diagonal must
        // vanish for axes to map onto axes.
        let a = c[0][0];
        let b = c[0][1];
        let c2 = c[1][0];
        let d = c[1][1];
        (b.abs() < AXIS_EPSILON && c2.abs() < AXIS_EPSILON)
            || (a.abs() < AXIS_EPSILON && d.abs() < AXIS_EPSILON)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols
            .iter()
            .all(|col| col.iter().all(|v| v.is_finite()))
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0, 0.0);
        let c = a * b;
        assert_eq!(c.col(3), [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn map_point_translation() {
        let t = Transform3d::from_translation(10.0, -5.0, 0.0);
        assert_eq!(t.map_point_2d(Point::new(1.0, 2.0)), Point::new(11.0, -3.0));
    }

    #[test]
    fn map_point_scale() {
        let t = Transform3d::from_scale(2.0, 3.0, 1.0);
        assert_eq!(t.map_point_2d(Point::new(1.0, 1.0)), Point::new(2.0, 3.0));
    }

    #[test]
    fn map_rect_rotation_is_bounding_box() {
        let t = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_4);
        let r = t.map_rect_2d(Rect::new(-1.0, -1.0, 1.0, 1.0));
        let expected = 2.0_f64.sqrt();
        assert!((r.width() - 2.0 * expected).abs() < 1e-9, "got {r:?}");
        assert!((r.height() - 2.0 * expected).abs() < 1e-9, "got {r:?}");
    }

    #[test]
    fn map_point_perspective_divides() {
        // w row picks up x: w = 1 + 0.01 * x.
        let mut t = Transform3d::IDENTITY;
        t.cols[0][3] = 0.01;
        let p = t.map_point_2d(Point::new(100.0, 50.0));
        assert!((p.x - 50.0).abs() < 1e-9, "got {p:?}");
        assert!((p.y - 25.0).abs() < 1e-9, "got {p:?}");
    }

    #[test]
    fn identity_is_axis_aligned() {
        assert!(Transform3d::IDENTITY.is_axis_aligned());
        assert!(Transform3d::from_translation(5.0, 6.0, 0.0).is_axis_aligned());
        assert!(Transform3d::from_scale(2.0, 0.5, 1.0).is_axis_aligned());
    }

    #[test]
    fn quarter_turn_is_axis_aligned() {
        let t = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        assert!(t.is_axis_aligned());
        let t = Transform3d::from_rotation_z(core::f64::consts::PI);
        assert!(t.is_axis_aligned());
    }

    #[test]
    fn eighth_turn_is_not_axis_aligned() {
        let t = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_4);
        assert!(!t.is_axis_aligned());
    }

    #[test]
    fn perspective_is_not_axis_aligned() {
        let mut t = Transform3d::IDENTITY;
        t.cols[0][3] = -1.0 / 500.0;
        assert!(!t.is_axis_aligned());
    }

    #[test]
    fn finiteness() {
        assert!(Transform3d::IDENTITY.is_finite());
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
    }
}
