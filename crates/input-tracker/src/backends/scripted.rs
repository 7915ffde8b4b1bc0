//! Scripted input source.
//!
//! Replays a fixed list of button/pointer samples, one per button query,
//! against a fixed display layout. Captures return a synthetic frame derived
//! from the requested rectangle, so results are reproducible byte for byte.

use std::collections::VecDeque;

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use stepcast_common::error::{StepcastError, StepcastResult};
use stepcast_platform_core::{DisplayInfo, MouseButton, Point, Rect};

use crate::InputSource;

/// One scripted observation of the monitored button and the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSample {
    pub pressed: bool,
    pub position: Point,
}

impl InputSample {
    pub fn pressed_at(position: Point) -> Self {
        Self {
            pressed: true,
            position,
        }
    }

    pub fn released_at(position: Point) -> Self {
        Self {
            pressed: false,
            position,
        }
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    pending: VecDeque<InputSample>,
    current: InputSample,
    polls: usize,
}

#[derive(Debug, Default)]
struct CaptureState {
    failures_pending: usize,
    regions: Vec<Rect>,
    display_queries: usize,
}

/// Deterministic input source for tests and offline demos.
///
/// Each call to [`InputSource::button_pressed`] consumes the next sample and
/// makes it current; [`InputSource::pointer_position`] reports the current
/// sample's position. Once the script is exhausted the button reads as
/// released at the last position.
#[derive(Debug, Default)]
pub struct ScriptedInputSource {
    displays: Mutex<Vec<DisplayInfo>>,
    script: Mutex<ScriptState>,
    captures: Mutex<CaptureState>,
}

impl ScriptedInputSource {
    pub fn new(displays: Vec<DisplayInfo>) -> Self {
        Self {
            displays: Mutex::new(displays),
            ..Self::default()
        }
    }

    /// Append samples to the script.
    pub fn with_samples(self, samples: impl IntoIterator<Item = InputSample>) -> Self {
        self.script.lock().pending.extend(samples);
        self
    }

    pub fn push_sample(&self, sample: InputSample) {
        self.script.lock().pending.push_back(sample);
    }

    /// Script one press/release edge at `position`.
    pub fn push_click(&self, position: Point) {
        let mut script = self.script.lock();
        script.pending.push_back(InputSample::pressed_at(position));
        script.pending.push_back(InputSample::released_at(position));
    }

    /// Script a press held for `ticks` consecutive samples, then a release.
    pub fn push_hold(&self, position: Point, ticks: usize) {
        let mut script = self.script.lock();
        for _ in 0..ticks {
            script.pending.push_back(InputSample::pressed_at(position));
        }
        script.pending.push_back(InputSample::released_at(position));
    }

    /// Script `ticks` released samples at the current position.
    pub fn push_idle(&self, ticks: usize) {
        let mut script = self.script.lock();
        let position = script
            .pending
            .back()
            .map(|s| s.position)
            .unwrap_or(script.current.position);
        for _ in 0..ticks {
            script.pending.push_back(InputSample::released_at(position));
        }
    }

    /// Make the next `count` captures fail.
    pub fn fail_next_captures(&self, count: usize) {
        self.captures.lock().failures_pending += count;
    }

    /// Replace the display layout reported from now on.
    pub fn set_displays(&self, displays: Vec<DisplayInfo>) {
        *self.displays.lock() = displays;
    }

    /// Samples not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().pending.len()
    }

    /// Number of button queries served so far.
    pub fn polls(&self) -> usize {
        self.script.lock().polls
    }

    /// Regions captured successfully, in order.
    pub fn captured_regions(&self) -> Vec<Rect> {
        self.captures.lock().regions.clone()
    }

    /// Number of display layout queries served so far.
    pub fn display_queries(&self) -> usize {
        self.captures.lock().display_queries
    }
}

impl InputSource for ScriptedInputSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn button_pressed(&self, _button: MouseButton) -> StepcastResult<bool> {
        let mut script = self.script.lock();
        script.polls += 1;
        match script.pending.pop_front() {
            Some(sample) => script.current = sample,
            None => script.current.pressed = false,
        }
        Ok(script.current.pressed)
    }

    fn pointer_position(&self) -> StepcastResult<Point> {
        Ok(self.script.lock().current.position)
    }

    fn list_displays(&self) -> StepcastResult<Vec<DisplayInfo>> {
        self.captures.lock().display_queries += 1;
        Ok(self.displays.lock().clone())
    }

    fn capture_region(&self, rect: Rect) -> StepcastResult<RgbaImage> {
        {
            let mut captures = self.captures.lock();
            if captures.failures_pending > 0 {
                captures.failures_pending -= 1;
                return Err(StepcastError::capture("scripted capture failure"));
            }
            if rect.is_empty() {
                return Err(StepcastError::capture(format!(
                    "cannot capture empty region {rect:?}"
                )));
            }
            captures.regions.push(rect);
        }
        Ok(synthetic_frame(rect))
    }
}

/// The frame the scripted source returns for `rect`.
///
/// A gradient over global coordinates with a constant blue channel, so no
/// pixel ever matches the default marker color.
pub fn synthetic_frame(rect: Rect) -> RgbaImage {
    RgbaImage::from_fn(rect.width, rect.height, |x, y| {
        let gx = rect.x as i64 + x as i64;
        let gy = rect.y as i64 + y as i64;
        Rgba([(gx & 0xff) as u8, (gy & 0xff) as u8, 0x80, 0xff])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_display() -> Vec<DisplayInfo> {
        vec![DisplayInfo::new(0, Rect::new(0, 0, 64, 48))]
    }

    #[test]
    fn samples_are_consumed_one_per_button_query() {
        let source = ScriptedInputSource::new(single_display());
        source.push_click(Point::new(5, 6));

        assert!(source.button_pressed(MouseButton::Left).unwrap());
        assert_eq!(source.pointer_position().unwrap(), Point::new(5, 6));
        assert!(!source.button_pressed(MouseButton::Left).unwrap());
        assert_eq!(source.remaining(), 0);
        assert!(!source.button_pressed(MouseButton::Left).unwrap());
        assert_eq!(source.polls(), 3);
    }

    #[test]
    fn hold_repeats_pressed_samples() {
        let source = ScriptedInputSource::new(single_display());
        source.push_hold(Point::new(1, 1), 3);
        let states: Vec<bool> = (0..4)
            .map(|_| source.button_pressed(MouseButton::Left).unwrap())
            .collect();
        assert_eq!(states, vec![true, true, true, false]);
    }

    #[test]
    fn scripted_failures_are_consumed() {
        let source = ScriptedInputSource::new(single_display());
        source.fail_next_captures(1);
        let rect = Rect::new(0, 0, 64, 48);
        assert!(matches!(
            source.capture_region(rect),
            Err(StepcastError::CaptureFailed { .. })
        ));
        let frame = source.capture_region(rect).unwrap();
        assert_eq!(frame.dimensions(), (64, 48));
        assert_eq!(source.captured_regions(), vec![rect]);
    }

    #[test]
    fn synthetic_frame_depends_on_global_origin() {
        let a = synthetic_frame(Rect::new(0, 0, 4, 4));
        let b = synthetic_frame(Rect::new(1920, 0, 4, 4));
        assert_eq!(a.get_pixel(1, 2), &Rgba([1, 2, 0x80, 0xff]));
        assert_eq!(b.get_pixel(1, 2), &Rgba([(1921 & 0xff) as u8, 2, 0x80, 0xff]));
        assert_ne!(a, b);
    }
}
