//! Pixel operations on RGBA rasters.

use image::{Rgba, RgbaImage};

use crate::drawing::geometry::{distance_to_segment, Point};
use crate::drawing::tool::{Tool, ToolSettings};

/// Fixed paint colour of the brush.
pub const PAINT: [u8; 3] = [255, 255, 255];

/// Alpha of the drawing layer when composited for preview.
pub const PREVIEW_ALPHA: f32 = 0.6;

/// Draw a round-capped segment from `from` to `to` with `settings`.
///
/// A pixel is covered when its centre lies within `brush_size / 2` of the
/// segment; a zero-length segment paints a disc. Each covered pixel is
/// blended exactly once.
pub fn draw_segment(raster: &mut RgbaImage, from: Point, to: Point, settings: &ToolSettings) {
    let radius = settings.radius();
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 || !from.is_finite() || !to.is_finite() {
        return;
    }

    let min_x = (from.x.min(to.x) - radius).floor().max(0.0) as u32;
    let min_y = (from.y.min(to.y) - radius).floor().max(0.0) as u32;
    let max_x = (from.x.max(to.x) + radius).ceil().min((width - 1) as f32);
    let max_y = (from.y.max(to.y) + radius).ceil().min((height - 1) as f32);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }
    let (max_x, max_y) = (max_x as u32, max_y as u32);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            // NaN distances count as uncovered.
            if !(distance_to_segment(centre, from, to) <= radius) {
                continue;
            }
            let pixel = raster.get_pixel_mut(x, y);
            *pixel = match settings.tool {
                Tool::Brush => source_over(*pixel, paint(settings.opacity)),
                Tool::Eraser => Rgba([0, 0, 0, 0]),
            };
        }
    }
}

fn paint(opacity: f32) -> Rgba<u8> {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([PAINT[0], PAINT[1], PAINT[2], alpha])
}

/// Porter-Duff source-over with straight (non-premultiplied) alpha.
pub fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        let value = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

fn overlay_channel(base: f32, top: f32) -> f32 {
    if base < 0.5 {
        2.0 * base * top
    } else {
        1.0 - 2.0 * (1.0 - base) * (1.0 - top)
    }
}

/// Blend `top` over `base` in overlay mode, scaled by `alpha`.
pub fn overlay_pixel(base: Rgba<u8>, top: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let top_a = f32::from(top[3]) / 255.0 * alpha.clamp(0.0, 1.0);
    if top_a <= 0.0 {
        return base;
    }
    let mix = |b: u8, t: u8| {
        let (b, t) = (f32::from(b) / 255.0, f32::from(t) / 255.0);
        let blended = overlay_channel(b, t);
        ((b + (blended - b) * top_a) * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgba([mix(base[0], top[0]), mix(base[1], top[1]), mix(base[2], top[2]), base[3]])
}

/// Background with the drawing layer overlaid at [`PREVIEW_ALPHA`].
pub fn compose_preview(background: &RgbaImage, drawing: &RgbaImage) -> RgbaImage {
    let mut out = background.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if x < drawing.width() && y < drawing.height() {
            *pixel = overlay_pixel(*pixel, *drawing.get_pixel(x, y), PREVIEW_ALPHA);
        }
    }
    out
}
