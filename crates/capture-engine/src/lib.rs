//! Stepcast Capture Engine
//!
//! Runs recording sessions: a background task polls the input source,
//! detects click edges, captures the display under the pointer, burns in a
//! marker, and appends the result to the session's step sequence.
//!
//! # Architecture
//!
//! ```text
//! Recorder::start ──spawn──► PollingTask (owns StepSequence)
//! Recorder::steps ──Snapshot─►   │ every tick:
//! Recorder::stop  ──Stop────►   │   ClickDetector
//!        ▲                      │   DisplayLayout::find
//!        │                      │   InputSource::capture_region
//!        │                      │   annotate
//!        │                      │   StepSequence::push
//!        └──── join ◄───────────┘ (returns the StepSequence)
//! ```

pub mod click;
pub mod recorder;
mod session;

pub use click::ClickDetector;
pub use recorder::{Recorder, RecorderConfig, RecorderState};
