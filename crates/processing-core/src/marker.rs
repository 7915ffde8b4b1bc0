//! Click marker annotation.
//!
//! The marker is a ring of small square blocks: 360 points sampled at
//! one-degree steps around a circle, each painted as a filled block in the
//! marker color. Blocks are clipped to the image; nothing is blended.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Marker geometry and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Circle radius in pixels.
    pub radius: u32,
    /// Edge length of each painted block in pixels.
    pub block_size: u32,
    /// Block color.
    pub color: Rgba<u8>,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 20,
            block_size: 5,
            color: Rgba([255, 0, 0, 255]),
        }
    }
}

impl MarkerStyle {
    /// Blocks extend this many pixels on each side of a sampled point.
    pub fn block_half_width(&self) -> u32 {
        self.block_size / 2
    }

    /// Largest per-axis distance from the center that the marker can touch.
    pub fn reach(&self) -> u32 {
        self.radius + self.block_half_width()
    }
}

const SAMPLES: u32 = 360;

/// Annotate with the default marker style.
pub fn annotate(image: &RgbaImage, x: i32, y: i32) -> RgbaImage {
    annotate_with(image, x, y, &MarkerStyle::default())
}

/// Return a copy of `image` with a marker centered at local point `(x, y)`.
///
/// The input is never modified. Only pixels inside the square of half-width
/// [`MarkerStyle::reach`] around the center can change, and the output is a
/// pure function of the inputs.
pub fn annotate_with(image: &RgbaImage, x: i32, y: i32, style: &MarkerStyle) -> RgbaImage {
    let mut out = image.clone();
    let size = style.block_size.max(1);
    let half = style.block_half_width() as i32;
    let radius = style.radius as f64;

    for angle in 0..SAMPLES {
        let radians = (angle as f64).to_radians();
        // Truncation toward zero keeps every sample within `radius` of the center.
        let px = (x as f64 + radius * radians.cos()) as i32;
        let py = (y as f64 + radius * radians.sin()) as i32;

        let block = Rect::at(px - half, py - half).of_size(size, size);
        draw_filled_rect_mut(&mut out, block, style.color);
    }

    out
}
