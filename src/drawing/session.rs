//! Drawing session: background, drawing layer, history and mask.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::drawing::error::DrawingResult;
use crate::drawing::geometry::{fit_within, DisplayMapping, Point};
use crate::drawing::history::History;
use crate::drawing::mask::Mask;
use crate::drawing::raster::{compose_preview, draw_segment};
use crate::drawing::source::ImageSource;
use crate::drawing::tool::ToolSettings;

/// A pointer event or command, in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Leave,
    Clear,
    Undo,
    Redo,
    Settings { settings: ToolSettings },
}

/// Single-user mask editor.
///
/// The background never changes after load. Strokes only touch the drawing
/// layer; the mask is regenerated after every committed change.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    background: RgbaImage,
    drawing: RgbaImage,
    history: History,
    settings: ToolSettings,
    last_point: Option<Point>,
    mask: Mask,
}

impl DrawingSession {
    /// Load `source` and fit it into `max_width x max_height`.
    pub async fn load_background(
        source: ImageSource,
        max_width: u32,
        max_height: u32,
    ) -> DrawingResult<Self> {
        let image = source.load().await?;
        Ok(Self::from_image(image, max_width, max_height))
    }

    pub fn from_image(image: DynamicImage, max_width: u32, max_height: u32) -> Self {
        let (width, height) = fit_within(image.width(), image.height(), max_width, max_height);
        let background = if (image.width(), image.height()) == (width, height) {
            image.to_rgba8()
        } else {
            image.resize_exact(width, height, FilterType::Triangle).to_rgba8()
        };

        tracing::debug!(width, height, "Drawing session ready");

        let drawing = RgbaImage::new(width, height);
        Self {
            background,
            history: History::new(drawing.clone()),
            drawing,
            settings: ToolSettings::default(),
            last_point: None,
            mask: Mask::blank(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.drawing.width()
    }

    pub fn height(&self) -> u32 {
        self.drawing.height()
    }

    pub fn settings(&self) -> ToolSettings {
        self.settings
    }

    /// Out-of-range values are clamped.
    pub fn set_settings(&mut self, settings: ToolSettings) {
        self.settings = settings.clamped();
    }

    pub fn is_stroking(&self) -> bool {
        self.last_point.is_some()
    }

    /// Start a stroke. Non-finite points are dropped.
    pub fn begin_stroke(&mut self, point: Point) {
        if point.is_finite() {
            self.last_point = Some(point);
        }
    }

    /// Draw from the last point to `point`. Ignored outside a stroke and
    /// for non-finite points.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(from) = self.last_point else {
            return;
        };
        if !point.is_finite() {
            return;
        }
        draw_segment(&mut self.drawing, from, point, &self.settings);
        self.last_point = Some(point);
    }

    /// Commit the stroke. `None` if no stroke was active.
    pub fn end_stroke(&mut self) -> Option<&Mask> {
        self.last_point.take()?;
        Some(self.commit())
    }

    pub fn clear(&mut self) -> &Mask {
        self.last_point = None;
        self.drawing = RgbaImage::new(self.width(), self.height());
        self.commit()
    }

    /// `None` at the oldest state.
    pub fn undo(&mut self) -> Option<&Mask> {
        let snapshot = self.history.undo()?.clone();
        Some(self.restore(snapshot))
    }

    /// `None` at the newest state.
    pub fn redo(&mut self) -> Option<&Mask> {
        let snapshot = self.history.redo()?.clone();
        Some(self.restore(snapshot))
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn drawing(&self) -> &RgbaImage {
        &self.drawing
    }

    pub fn background(&self) -> &RgbaImage {
        &self.background
    }

    /// Background with the drawing overlaid, for display.
    pub fn preview(&self) -> RgbaImage {
        compose_preview(&self.background, &self.drawing)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply one event. Returns the mask if it was regenerated.
    pub fn apply(&mut self, event: CanvasEvent, mapping: &DisplayMapping) -> Option<&Mask> {
        let (width, height) = (self.width(), self.height());
        match event {
            CanvasEvent::Down { x, y } => {
                self.begin_stroke(mapping.to_raster(Point::new(x, y), width, height));
                None
            }
            CanvasEvent::Move { x, y } => {
                self.extend_stroke(mapping.to_raster(Point::new(x, y), width, height));
                None
            }
            CanvasEvent::Up | CanvasEvent::Leave => self.end_stroke(),
            CanvasEvent::Clear => Some(self.clear()),
            CanvasEvent::Undo => self.undo(),
            CanvasEvent::Redo => self.redo(),
            CanvasEvent::Settings { settings } => {
                self.set_settings(settings);
                None
            }
        }
    }

    /// Apply every event in order; a stroke still open at the end is
    /// committed. Returns the final mask.
    pub fn replay<I>(&mut self, events: I, mapping: &DisplayMapping) -> &Mask
    where
        I: IntoIterator<Item = CanvasEvent>,
    {
        let mut applied = 0usize;
        for event in events {
            self.apply(event, mapping);
            applied += 1;
        }
        self.end_stroke();
        tracing::debug!(
            events = applied,
            history = self.history.len(),
            coverage = self.mask.coverage(),
            "Replayed canvas events"
        );
        &self.mask
    }

    fn commit(&mut self) -> &Mask {
        self.history.commit(self.drawing.clone());
        self.mask = Mask::from_drawing(&self.drawing);
        &self.mask
    }

    fn restore(&mut self, snapshot: RgbaImage) -> &Mask {
        self.drawing = snapshot;
        self.mask = Mask::from_drawing(&self.drawing);
        &self.mask
    }
}
