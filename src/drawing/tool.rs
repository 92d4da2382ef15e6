//! Drawing tools and their settings.

use serde::{Deserialize, Serialize};

pub const MIN_BRUSH_SIZE: f32 = 5.0;
pub const MAX_BRUSH_SIZE: f32 = 100.0;
pub const MIN_OPACITY: f32 = 0.1;
pub const MAX_OPACITY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Paints white at the configured opacity.
    #[default]
    Brush,
    /// Removes paint at full strength.
    Eraser,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolSettings {
    pub tool: Tool,
    pub brush_size: f32,
    pub opacity: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            brush_size: 20.0,
            opacity: 0.8,
        }
    }
}

impl ToolSettings {
    pub fn new(tool: Tool, brush_size: f32, opacity: f32) -> Self {
        Self {
            tool,
            brush_size,
            opacity,
        }
        .clamped()
    }

    /// Pull out-of-range values back into range. NaN takes the minimum.
    pub fn clamped(self) -> Self {
        Self {
            tool: self.tool,
            brush_size: clamp_or_min(self.brush_size, MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            opacity: clamp_or_min(self.opacity, MIN_OPACITY, MAX_OPACITY),
        }
    }

    pub fn radius(&self) -> f32 {
        self.brush_size / 2.0
    }
}

fn clamp_or_min(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
