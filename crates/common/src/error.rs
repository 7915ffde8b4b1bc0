//! Error types shared across Stepcast crates.

/// Top-level error type for Stepcast operations.
#[derive(Debug, thiserror::Error)]
pub enum StepcastError {
    #[error("A recording session is already in progress")]
    AlreadyRecording,

    #[error("No recording session is in progress")]
    NotRecording,

    #[error("No steps were recorded")]
    NoStepsRecorded,

    #[error("Point ({x}, {y}) is not on any display")]
    DisplayLookupMiss { x: i32, y: i32 },

    #[error("Screen capture failed: {message}")]
    CaptureFailed { message: String },

    #[error("Image encoding failed: {message}")]
    EncodeFailed { message: String },

    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Step {id} is not part of this sequence")]
    StepNotFound { id: u64 },

    #[error("Recording task failed: {message}")]
    RecordingTask { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StepcastError.
pub type StepcastResult<T> = Result<T, StepcastError>;

impl StepcastError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::CaptureFailed {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeFailed {
            message: msg.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn recording_task(msg: impl Into<String>) -> Self {
        Self::RecordingTask {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error belongs to a single polling tick and must not end the session.
    pub fn is_per_tick(&self) -> bool {
        matches!(
            self,
            Self::DisplayLookupMiss { .. } | Self::CaptureFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_tick_classification() {
        assert!(StepcastError::DisplayLookupMiss { x: -5, y: -5 }.is_per_tick());
        assert!(StepcastError::capture("grab failed").is_per_tick());
        assert!(!StepcastError::AlreadyRecording.is_per_tick());
        assert!(!StepcastError::encode("png").is_per_tick());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = StepcastError::unsupported_format("docx");
        assert_eq!(err.to_string(), "Unsupported output format: docx");
        let err = StepcastError::DisplayLookupMiss { x: -5, y: 7 };
        assert_eq!(err.to_string(), "Point (-5, 7) is not on any display");
    }
}
