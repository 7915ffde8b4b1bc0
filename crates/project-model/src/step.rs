//! Captured step types.

use std::fmt;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use stepcast_platform_core::{MouseButton, Point};

/// Stable identity of a step within its sequence.
///
/// Assigned on append and never reused, so a review action issued against
/// an id keeps targeting the same step after reorders and deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of user action produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StepAction {
    /// Pointer button click.
    Click { button: MouseButton },
}

impl StepAction {
    /// Human-readable label used in exported documents.
    pub fn label(&self) -> &'static str {
        match self {
            StepAction::Click {
                button: MouseButton::Left,
            } => "Mouse Click",
            StepAction::Click {
                button: MouseButton::Right,
            } => "Right Click",
            StepAction::Click {
                button: MouseButton::Middle,
            } => "Middle Click",
        }
    }
}

/// One captured moment of a recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub(crate) id: StepId,

    /// Annotated screenshot of the display that received the click.
    pub screenshot: RgbaImage,

    /// Optional note added during review.
    pub description: Option<String>,

    /// Capture instant.
    pub timestamp: DateTime<Utc>,

    /// What produced the step.
    pub action: StepAction,

    /// Global pointer position at capture time.
    pub coordinates: Point,

    /// Whether a marker was burned into the screenshot.
    pub highlighted: bool,
}

impl Step {
    /// A step produced by a pointer click, with the click marker already drawn.
    pub fn click(
        screenshot: RgbaImage,
        button: MouseButton,
        coordinates: Point,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StepId(0),
            screenshot,
            description: None,
            timestamp,
            action: StepAction::Click { button },
            coordinates,
            highlighted: true,
        }
    }

    /// Identity assigned when the step was appended to a sequence.
    pub fn id(&self) -> StepId {
        self.id
    }

    /// Description text, treating an empty string as no description.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn width(&self) -> u32 {
        self.screenshot.width()
    }

    pub fn height(&self) -> u32 {
        self.screenshot.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_step_is_highlighted_without_description() {
        let step = Step::click(
            RgbaImage::new(4, 3),
            MouseButton::Left,
            Point::new(10, 20),
            Utc::now(),
        );
        assert!(step.highlighted);
        assert_eq!(step.description_text(), None);
        assert_eq!(step.action.label(), "Mouse Click");
        assert_eq!((step.width(), step.height()), (4, 3));
    }

    #[test]
    fn blank_description_counts_as_absent() {
        let mut step = Step::click(
            RgbaImage::new(1, 1),
            MouseButton::Left,
            Point::default(),
            Utc::now(),
        );
        step.description = Some("   ".to_string());
        assert_eq!(step.description_text(), None);
        step.description = Some(" Open the menu ".to_string());
        assert_eq!(step.description_text(), Some("Open the menu"));
    }
}
