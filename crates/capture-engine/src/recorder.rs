//! Recording session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use image::Rgba;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use stepcast_common::clock::SessionClock;
use stepcast_common::config::RecordingDefaults;
use stepcast_common::error::{StepcastError, StepcastResult};
use stepcast_input_tracker::InputSource;
use stepcast_platform_core::{DisplayLayout, MouseButton};
use stepcast_processing_core::MarkerStyle;
use stepcast_project_model::StepSequence;

use crate::session::{PollingTask, SessionCommand};

/// Recorder parameters.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// How often the button state is sampled.
    pub tick_interval: Duration,

    /// Button whose clicks produce steps.
    pub button: MouseButton,

    /// Marker drawn at each click point.
    pub marker: MarkerStyle,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            button: MouseButton::Left,
            marker: MarkerStyle::default(),
        }
    }
}

impl RecorderConfig {
    pub fn from_defaults(defaults: &RecordingDefaults) -> Self {
        Self {
            tick_interval: Duration::from_millis(defaults.tick_interval_ms.max(1)),
            button: MouseButton::Left,
            marker: MarkerStyle {
                radius: defaults.marker_radius,
                block_size: defaults.marker_block_size,
                color: Rgba(defaults.marker_color),
            },
        }
    }
}

/// State of a recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// No session is running.
    Idle,
    /// A polling task is capturing clicks.
    Recording,
}

struct ActiveSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    task: JoinHandle<StepSequence>,
    step_count: watch::Receiver<usize>,
    clock: SessionClock,
}

/// Turns clicks into annotated steps, one session at a time.
///
/// `start` spawns a polling task on the current tokio runtime and returns
/// immediately. `stop` waits for that task to exit and takes its steps, so
/// no capture can land after the caller has received the final sequence.
pub struct Recorder {
    source: Arc<dyn InputSource>,
    config: RecorderConfig,
    session: Option<ActiveSession>,
    finished: StepSequence,
}

impl Recorder {
    pub fn new(source: Arc<dyn InputSource>, config: RecorderConfig) -> Self {
        Self {
            source,
            config,
            session: None,
            finished: StepSequence::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        if self.session.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Begin a new session.
    ///
    /// Must be called from within a tokio runtime. Discards the steps of any
    /// previous session.
    pub fn start(&mut self) -> StepcastResult<()> {
        if self.session.is_some() {
            return Err(StepcastError::AlreadyRecording);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            StepcastError::platform(format!("Recorder must run inside a tokio runtime: {e}"))
        })?;

        let layout = match self.source.display_layout() {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read display layout, will retry on first click");
                DisplayLayout::default()
            }
        };
        if let Some(bounds) = layout.virtual_bounds() {
            tracing::info!(
                displays = layout.len(),
                x = bounds.x,
                y = bounds.y,
                width = bounds.width,
                height = bounds.height,
                "Display layout captured"
            );
        }

        self.finished = StepSequence::new();

        let clock = SessionClock::start();
        let (commands, receiver) = mpsc::unbounded_channel();
        let (count_tx, step_count) = watch::channel(0);
        let task = PollingTask::new(
            Arc::clone(&self.source),
            self.config.clone(),
            layout,
            clock.clone(),
            count_tx,
        );
        let task = runtime.spawn(task.run(receiver));

        tracing::info!(
            backend = self.source.name(),
            started_at = %clock.epoch_wall(),
            "Recording started"
        );

        self.session = Some(ActiveSession {
            commands,
            task,
            step_count,
            clock,
        });
        Ok(())
    }

    /// End the session and take ownership of its steps.
    ///
    /// Waits for the polling task to finish any in-flight capture and exit.
    pub async fn stop(&mut self) -> StepcastResult<StepSequence> {
        let session = self.session.take().ok_or(StepcastError::NotRecording)?;

        // A send error means the task is already gone; the join reports why.
        let _ = session.commands.send(SessionCommand::Stop);
        let steps = session
            .task
            .await
            .map_err(|e| StepcastError::recording_task(e.to_string()))?;

        tracing::info!(
            steps = steps.len(),
            duration_secs = session.clock.elapsed_secs(),
            "Recording stopped"
        );

        self.finished = steps.clone();
        Ok(steps)
    }

    /// Copy of the current steps.
    ///
    /// While recording this is a snapshot served by the polling task, which
    /// answers even while a capture is in progress. Afterwards it is the
    /// finalized sequence of the last session.
    pub async fn steps(&self) -> StepSequence {
        let Some(session) = &self.session else {
            return self.finished.clone();
        };

        let (reply, response) = oneshot::channel();
        if session
            .commands
            .send(SessionCommand::Snapshot(reply))
            .is_err()
        {
            tracing::warn!("Polling task is gone; no steps to report until stop");
            return StepSequence::new();
        }
        match response.await {
            Ok(steps) => steps,
            Err(_) => {
                tracing::warn!("Polling task exited before answering a snapshot request");
                StepSequence::new()
            }
        }
    }

    /// Number of steps captured so far, without waiting on the polling task.
    pub fn step_count(&self) -> usize {
        match &self.session {
            Some(session) => *session.step_count.borrow(),
            None => self.finished.len(),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::warn!("Recorder dropped while recording; discarding session");
            let _ = session.commands.send(SessionCommand::Stop);
        }
    }
}
