//! The polling task behind a recording session.
//!
//! The task owns the session's step sequence outright. The recorder talks to
//! it only through [`SessionCommand`] messages and receives the final
//! sequence as the task's return value, so handing off the sequence and
//! joining the task are the same event.

use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use stepcast_common::clock::SessionClock;
use stepcast_common::error::{StepcastError, StepcastResult};
use stepcast_input_tracker::InputSource;
use stepcast_platform_core::{DisplayInfo, DisplayLayout, Point, Rect};
use stepcast_processing_core::annotate_with;
use stepcast_project_model::{Step, StepSequence};

use crate::click::ClickDetector;
use crate::recorder::RecorderConfig;

/// Requests from the recorder to its polling task.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    /// Reply with a copy of the steps captured so far.
    Snapshot(oneshot::Sender<StepSequence>),
    /// Finish any in-flight capture and exit.
    Stop,
}

/// A capture running on the blocking pool.
struct InFlight {
    pointer: Point,
    worker: JoinHandle<StepcastResult<Step>>,
}

impl InFlight {
    async fn wait(&mut self) -> StepcastResult<Step> {
        (&mut self.worker)
            .await
            .map_err(|e| StepcastError::capture(format!("Capture worker failed: {e}")))?
    }
}

/// Resolves with the in-flight capture's result, or never if there is none.
async fn wait_in_flight(in_flight: &mut Option<InFlight>) -> StepcastResult<Step> {
    match in_flight {
        Some(capture) => capture.wait().await,
        None => std::future::pending().await,
    }
}

pub(crate) struct PollingTask {
    source: Arc<dyn InputSource>,
    config: RecorderConfig,
    layout: DisplayLayout,
    detector: ClickDetector,
    steps: StepSequence,
    clock: SessionClock,
    step_count: watch::Sender<usize>,
}

impl PollingTask {
    pub(crate) fn new(
        source: Arc<dyn InputSource>,
        config: RecorderConfig,
        layout: DisplayLayout,
        clock: SessionClock,
        step_count: watch::Sender<usize>,
    ) -> Self {
        Self {
            source,
            config,
            layout,
            detector: ClickDetector::new(),
            steps: StepSequence::new(),
            clock,
            step_count,
        }
    }

    /// Poll until stopped, then hand back the session's steps.
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) -> StepSequence {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: Option<InFlight> = None;

        tracing::debug!(
            backend = self.source.name(),
            tick_ms = self.config.tick_interval.as_millis() as u64,
            "Polling loop started"
        );

        // Sampling pauses while a capture runs; commands are served throughout.
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(SessionCommand::Snapshot(reply)) => {
                        let _ = reply.send(self.steps.clone());
                    }
                    Some(SessionCommand::Stop) | None => break,
                },
                result = wait_in_flight(&mut in_flight) => {
                    if let Some(capture) = in_flight.take() {
                        self.record(capture.pointer, result);
                    }
                }
                _ = ticker.tick(), if in_flight.is_none() => in_flight = self.tick(),
            }
        }

        if let Some(mut capture) = in_flight.take() {
            let result = capture.wait().await;
            self.record(capture.pointer, result);
        }

        tracing::debug!(steps = self.steps.len(), "Polling loop exited");
        self.steps
    }

    /// Sample the button once. Starts a capture on a click edge.
    fn tick(&mut self) -> Option<InFlight> {
        let pressed = match self.source.button_pressed(self.config.button) {
            Ok(pressed) => pressed,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read button state");
                return None;
            }
        };
        if !self.detector.observe(pressed) {
            return None;
        }

        let pointer = match self.source.pointer_position() {
            Ok(pointer) => pointer,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read pointer position, skipping click");
                return None;
            }
        };

        match self.resolve_display(pointer) {
            Ok(display) => Some(self.spawn_capture(pointer, display.rect)),
            Err(e) => {
                tracing::warn!(error = %e, x = pointer.x, y = pointer.y, "Skipping click");
                None
            }
        }
    }

    /// Capture and annotate `rect` on the blocking pool.
    fn spawn_capture(&self, pointer: Point, rect: Rect) -> InFlight {
        let timestamp = self.clock.now();
        let source = Arc::clone(&self.source);
        let marker = self.config.marker;
        let button = self.config.button;

        let worker = tokio::task::spawn_blocking(move || -> StepcastResult<Step> {
            let captured = source.capture_region(rect)?;
            let local = local_pixel(rect, pointer, &captured);
            let screenshot = annotate_with(&captured, local.x, local.y, &marker);
            Ok(Step::click(screenshot, button, pointer, timestamp))
        });

        InFlight { pointer, worker }
    }

    fn record(&mut self, pointer: Point, result: StepcastResult<Step>) {
        match result {
            Ok(step) => {
                let id = self.steps.push(step);
                self.step_count.send_replace(self.steps.len());
                tracing::info!(
                    step = %id,
                    x = pointer.x,
                    y = pointer.y,
                    total = self.steps.len(),
                    "Captured step"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, x = pointer.x, y = pointer.y, "Skipping click");
                if matches!(e, StepcastError::CaptureFailed { .. }) {
                    self.refresh_layout();
                }
            }
        }
    }

    /// Display owning `pointer`, re-querying the layout once on a miss.
    fn resolve_display(&mut self, pointer: Point) -> StepcastResult<DisplayInfo> {
        if let Some(display) = self.layout.find(pointer) {
            return Ok(display.clone());
        }

        self.refresh_layout();
        self.layout
            .find(pointer)
            .cloned()
            .ok_or(StepcastError::DisplayLookupMiss {
                x: pointer.x,
                y: pointer.y,
            })
    }

    fn refresh_layout(&mut self) {
        match self.source.display_layout() {
            Ok(layout) => {
                tracing::debug!(displays = layout.len(), "Refreshed display layout");
                self.layout = layout;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to refresh display layout"),
        }
    }
}

/// Pixel in `captured` under the global `pointer`.
///
/// Captures may come back at a different resolution than the logical
/// display bounds (HiDPI), so the local offset is scaled to the image.
fn local_pixel(rect: Rect, pointer: Point, captured: &RgbaImage) -> Point {
    let local = rect.to_local(pointer);
    if captured.dimensions() == (rect.width, rect.height) || rect.is_empty() {
        return local;
    }
    let scale_x = captured.width() as f64 / rect.width as f64;
    let scale_y = captured.height() as f64 / rect.height as f64;
    Point::new(
        (local.x as f64 * scale_x) as i32,
        (local.y as f64 * scale_y) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_pixel_is_plain_offset_at_native_resolution() {
        let rect = Rect::new(1920, 0, 1920, 1080);
        let captured = RgbaImage::new(1920, 1080);
        assert_eq!(
            local_pixel(rect, Point::new(2000, 100), &captured),
            Point::new(80, 100)
        );
    }

    #[test]
    fn local_pixel_scales_to_hidpi_capture() {
        let rect = Rect::new(-1440, 0, 1440, 900);
        let captured = RgbaImage::new(2880, 1800);
        assert_eq!(
            local_pixel(rect, Point::new(-1340, 50), &captured),
            Point::new(200, 100)
        );
    }
}
