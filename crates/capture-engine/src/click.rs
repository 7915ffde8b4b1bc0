//! Click edge detection.
//!
//! Clicks are level-polled: the recorder samples the button once per tick
//! and a click is a released-to-pressed transition between two consecutive
//! samples. A press spanning many ticks is one click. A press that starts
//! and ends between two samples is never observed.

/// Edge detector over successive button samples.
#[derive(Debug, Clone, Default)]
pub struct ClickDetector {
    was_pressed: bool,
}

impl ClickDetector {
    /// A detector whose prior sample reads as released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample. Returns `true` on a released-to-pressed edge.
    pub fn observe(&mut self, pressed: bool) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}
