//! Stepcast Input Tracker
//!
//! Exposes the platform capabilities a recording session consumes through
//! one [`InputSource`] trait:
//!
//! - **Button state:** is a given pointer button held right now
//! - **Pointer position:** global desktop coordinates
//! - **Display layout:** the active display rectangles
//! - **Region capture:** pixels of one rectangle
//!
//! Two backends implement it: a scripted, deterministic source for offline
//! tests and demos, and the desktop source (feature `native`).

pub mod backends;

use image::RgbaImage;
use stepcast_common::error::StepcastResult;
use stepcast_platform_core::{DisplayInfo, DisplayLayout, MouseButton, Point, Rect};

/// Platform capabilities consumed by the recorder.
///
/// Implementations are queried from the recorder's polling task, and
/// [`InputSource::capture_region`] runs on a blocking worker thread, hence
/// `Send + Sync`.
pub trait InputSource: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Whether `button` is currently held down.
    fn button_pressed(&self, button: MouseButton) -> StepcastResult<bool>;

    /// Current pointer position in global desktop coordinates.
    fn pointer_position(&self) -> StepcastResult<Point>;

    /// Active displays, ordered by index.
    fn list_displays(&self) -> StepcastResult<Vec<DisplayInfo>>;

    /// Capture the pixels of `rect` (global coordinates).
    fn capture_region(&self, rect: Rect) -> StepcastResult<RgbaImage>;

    /// Current display layout.
    fn display_layout(&self) -> StepcastResult<DisplayLayout> {
        Ok(DisplayLayout::new(self.list_displays()?))
    }
}

pub use backends::detect_input_source;
