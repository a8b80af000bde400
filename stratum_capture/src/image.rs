// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendered layer images.

use std::sync::Arc;

use kurbo::Rect;

/// The pixels behind a [`LayerImage`].
///
/// A straight-alpha RGBA buffer at the renderer's scale. Resources are
/// shared: when only a layer's geometry changes, the renderer hands out a
/// new [`LayerImage`] that points at the same resource under a new frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageResource {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixels per root-space unit.
    pub scale: f64,
    /// `width * height * 4` bytes of RGBA data, row-major.
    pub pixels: Vec<u8>,
}

impl ImageResource {
    /// Returns the RGBA value at pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }
}

/// A rendered (or reused) raster for one layer in one frame.
///
/// Identity matters: the renderer returns the *same* `Arc<LayerImage>` for a
/// cache hit, so downstream diffing can skip re-encoding by pointer
/// comparison. A geometry-only change produces a distinct `LayerImage`
/// sharing the previous [`ImageResource`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayerImage {
    /// The rectangle this image covers, in root space. May be a partial
    /// region of the layer when the visible rect was clipped.
    pub frame: Rect,
    /// The backing pixel buffer.
    pub resource: Arc<ImageResource>,
}

impl LayerImage {
    /// Returns whether two images share the same backing pixels.
    #[must_use]
    pub fn shares_resource(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> Arc<ImageResource> {
        Arc::new(ImageResource {
            width: 2,
            height: 1,
            scale: 1.0,
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8],
        })
    }

    #[test]
    fn pixel_lookup() {
        let r = resource();
        assert_eq!(r.pixel(0, 0), [1, 2, 3, 4]);
        assert_eq!(r.pixel(1, 0), [5, 6, 7, 8]);
    }

    #[test]
    fn shared_resource_is_detected() {
        let r = resource();
        let a = LayerImage {
            frame: Rect::new(0.0, 0.0, 2.0, 1.0),
            resource: r.clone(),
        };
        let b = LayerImage {
            frame: Rect::new(10.0, 10.0, 12.0, 11.0),
            resource: r,
        };
        assert!(a.shares_resource(&b));

        let c = LayerImage {
            frame: a.frame,
            resource: resource(),
        };
        assert!(!a.shares_resource(&c));
    }
}
