//! Input source backend implementations.

#[cfg(feature = "native")]
mod desktop;
mod scripted;

#[cfg(feature = "native")]
pub use desktop::DesktopInputSource;
pub use scripted::{synthetic_frame, InputSample, ScriptedInputSource};

use std::sync::Arc;

use stepcast_common::error::StepcastResult;

use crate::InputSource;

/// Detect the input source for the current system.
#[cfg(feature = "native")]
pub fn detect_input_source() -> StepcastResult<Arc<dyn InputSource>> {
    let source = DesktopInputSource::new()?;
    tracing::info!(backend = source.name(), "Using desktop input source");
    Ok(Arc::new(source))
}

/// Detect the input source for the current system.
#[cfg(not(feature = "native"))]
pub fn detect_input_source() -> StepcastResult<Arc<dyn InputSource>> {
    tracing::warn!("Built without the `native` feature; no desktop input source is available");
    Err(stepcast_common::error::StepcastError::platform(
        "desktop capture is not available in this build (enable the `native` feature)",
    ))
}
