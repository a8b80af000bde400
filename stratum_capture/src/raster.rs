// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software rasterization of a layer's visible rectangle.
//!
//! The painter fills the requested root-space rectangle with the live
//! layer's background and strokes its border. Platform content buffers are
//! opaque handles whose pixels live outside this system, so layers whose
//! only content is a buffer rasterize as transparent — the downstream
//! serializer resolves the buffer through its own channel. Corner radii are
//! recorded on the snapshot for the wire format but not rounded here.

use kurbo::Rect;
use stratum_core::color::Rgba;
use stratum_core::layer::LayerStore;
use thiserror::Error;

use crate::image::ImageResource;
use crate::snapshot::LayerSnapshot;

/// Largest pixel dimension the painter will allocate.
const MAX_DIMENSION: u32 = 8192;

/// Why rasterization of one candidate failed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub(crate) enum RasterError {
    #[error("source layer has been destroyed since capture")]
    MissingLayer,
    #[error("render rectangle maps to zero pixels")]
    EmptyRect,
    #[error("render rectangle exceeds the maximum texture dimension")]
    Oversized,
}

/// Rasterizes `rect` (root space) of the layer behind `snapshot`.
///
/// Colors are re-read from the live layer at render time; geometry comes
/// from the snapshot, whose rectangles were normalized at capture time.
pub(crate) fn rasterize(
    tree: &LayerStore,
    snapshot: &LayerSnapshot,
    rect: Rect,
    scale: f64,
) -> Result<ImageResource, RasterError> {
    if !tree.is_alive(snapshot.source) {
        return Err(RasterError::MissingLayer);
    }

    let width = (rect.width() * scale).ceil() as i64;
    let height = (rect.height() * scale).ceil() as i64;
    if width <= 0 || height <= 0 {
        return Err(RasterError::EmptyRect);
    }
    if width > i64::from(MAX_DIMENSION) || height > i64::from(MAX_DIMENSION) {
        return Err(RasterError::Oversized);
    }
    let width = width as u32;
    let height = height as u32;

    let background = tree.background(snapshot.source);
    let border_width = tree.border_width(snapshot.source);
    let border_color = tree.border_color(snapshot.source);
    let frame = snapshot.frame;

    let background_px = background.map(Rgba::to_rgba8).unwrap_or([0, 0, 0, 0]);
    let border_px = border_color.map(Rgba::to_rgba8);
    let stroke_border = border_width > 0.0 && border_px.is_some();

    let mut pixels = vec![0_u8; (width as usize) * (height as usize) * 4];
    for py in 0..height {
        for px in 0..width {
            // Pixel center in root space.
            let x = rect.x0 + (f64::from(px) + 0.5) / scale;
            let y = rect.y0 + (f64::from(py) + 0.5) / scale;
            if x < frame.x0 || x > frame.x1 || y < frame.y0 || y > frame.y1 {
                continue;
            }

            let on_border = stroke_border
                && (x < frame.x0 + border_width
                    || x > frame.x1 - border_width
                    || y < frame.y0 + border_width
                    || y > frame.y1 - border_width);

            let value = if on_border {
                border_px.unwrap_or(background_px)
            } else {
                background_px
            };

            let offset = ((py * width + px) * 4) as usize;
            pixels[offset..offset + 4].copy_from_slice(&value);
        }
    }

    Ok(ImageResource {
        width,
        height,
        scale,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use stratum_core::context::RecordingContext;

    use super::*;

    fn snapshot_of(store: &mut LayerStore, id: stratum_core::layer::LayerId) -> LayerSnapshot {
        LayerSnapshot::capture(store, id, &RecordingContext::default())
    }

    #[test]
    fn fills_background() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 4.0, 2.0));
        store.set_background(layer, Some(Rgba::rgb(1.0, 0.0, 0.0)));
        let snapshot = snapshot_of(&mut store, layer);

        let resource = rasterize(&store, &snapshot, snapshot.frame, 1.0).expect("renders");

        assert_eq!((resource.width, resource.height), (4, 2));
        assert_eq!(resource.pixel(2, 1), [255, 0, 0, 255]);
    }

    #[test]
    fn strokes_border_over_background() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 10.0, 10.0));
        store.set_background(layer, Some(Rgba::WHITE));
        store.set_border_width(layer, 2.0);
        store.set_border_color(layer, Some(Rgba::BLACK));
        let snapshot = snapshot_of(&mut store, layer);

        let resource = rasterize(&store, &snapshot, snapshot.frame, 1.0).expect("renders");

        assert_eq!(resource.pixel(0, 0), [0, 0, 0, 255], "corner is border");
        assert_eq!(resource.pixel(5, 5), [255, 255, 255, 255], "center is fill");
    }

    #[test]
    fn partial_rect_renders_only_that_region() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 100.0, 10.0));
        store.set_background(layer, Some(Rgba::rgb(0.0, 1.0, 0.0)));
        let snapshot = snapshot_of(&mut store, layer);

        let resource = rasterize(&store, &snapshot, Rect::new(40.0, 0.0, 60.0, 10.0), 1.0)
            .expect("renders");

        assert_eq!((resource.width, resource.height), (20, 10));
        assert_eq!(resource.pixel(0, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn scale_multiplies_pixel_dimensions() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 4.0, 2.0));
        let snapshot = snapshot_of(&mut store, layer);

        let resource = rasterize(&store, &snapshot, snapshot.frame, 2.0).expect("renders");

        assert_eq!((resource.width, resource.height), (8, 4));
        assert_eq!(resource.scale, 2.0);
    }

    #[test]
    fn zero_area_rect_is_rejected() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 4.0, 2.0));
        let snapshot = snapshot_of(&mut store, layer);

        let result = rasterize(&store, &snapshot, Rect::ZERO, 1.0);
        assert_eq!(result, Err(RasterError::EmptyRect));
    }

    #[test]
    fn destroyed_layer_is_rejected() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 4.0, 2.0));
        let snapshot = snapshot_of(&mut store, layer);
        store.destroy_layer(layer);

        let result = rasterize(&store, &snapshot, snapshot.frame, 1.0);
        assert_eq!(result, Err(RasterError::MissingLayer));
    }

    #[test]
    fn oversized_rect_is_rejected() {
        let mut store = LayerStore::new();
        let layer = store.create_layer();
        store.set_bounds(layer, Rect::new(0.0, 0.0, 100_000.0, 10.0));
        let snapshot = snapshot_of(&mut store, layer);

        let result = rasterize(&store, &snapshot, snapshot.frame, 1.0);
        assert_eq!(result, Err(RasterError::Oversized));
    }
}
