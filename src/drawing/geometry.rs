//! Raster geometry: points, aspect fitting, screen-to-raster mapping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Largest size inside `max_width x max_height` with the aspect ratio of
/// `width x height`. Small images are scaled up.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_width.max(1), max_height.max(1));
    }
    let (w, h) = (u64::from(width), u64::from(height));
    let (max_w, max_h) = (u64::from(max_width), u64::from(max_height));
    // Integer cross-multiplication keeps the floor exact.
    let (fitted_w, fitted_h) = if w * max_h >= h * max_w {
        (max_w, h * max_w / w)
    } else {
        (w * max_h / h, max_h)
    };
    (fitted_w.max(1) as u32, fitted_h.max(1) as u32)
}

/// Where the raster is displayed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayMapping {
    pub origin_x: f32,
    pub origin_y: f32,
    pub display_width: f32,
    pub display_height: f32,
}

impl DisplayMapping {
    /// `(client - origin) * raster / display`. A zero display dimension
    /// leaves that axis unscaled.
    pub fn to_raster(&self, client: Point, raster_width: u32, raster_height: u32) -> Point {
        let scale = |raster: u32, display: f32| {
            if display > 0.0 {
                raster as f32 / display
            } else {
                1.0
            }
        };
        Point {
            x: (client.x - self.origin_x) * scale(raster_width, self.display_width),
            y: (client.y - self.origin_y) * scale(raster_height, self.display_height),
        }
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
