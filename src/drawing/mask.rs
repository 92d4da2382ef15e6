//! Binary mask derivation and encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{GrayImage, ImageFormat, Luma, RgbaImage};
use std::io::Cursor;

use crate::drawing::error::DrawingResult;

pub const EDITABLE: u8 = 255;
pub const PROTECTED: u8 = 0;

/// Black where the image is protected, white where it may be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pixels: GrayImage,
}

impl Mask {
    /// White wherever the drawing has any alpha.
    pub fn from_drawing(drawing: &RgbaImage) -> Self {
        let pixels = GrayImage::from_fn(drawing.width(), drawing.height(), |x, y| {
            if drawing.get_pixel(x, y)[3] > 0 {
                Luma([EDITABLE])
            } else {
                Luma([PROTECTED])
            }
        });
        Self { pixels }
    }

    /// All black.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::from_pixel(width, height, Luma([PROTECTED])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_editable(&self, x: u32, y: u32) -> bool {
        self.pixels
            .get_pixel_checked(x, y)
            .is_some_and(|p| p[0] == EDITABLE)
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[0] == PROTECTED)
    }

    /// Fraction of editable pixels.
    pub fn coverage(&self) -> f64 {
        let total = u64::from(self.width()) * u64::from(self.height());
        if total == 0 {
            return 0.0;
        }
        let editable = self.pixels.pixels().filter(|p| p[0] == EDITABLE).count();
        editable as f64 / total as f64
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.pixels
    }

    pub fn encode_png(&self) -> DrawingResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// `data:image/png;base64,...`, ready to send as an image URL.
    pub fn to_data_url(&self) -> DrawingResult<String> {
        let encoded = BASE64.encode(self.encode_png()?);
        Ok(format!("data:image/png;base64,{encoded}"))
    }
}
