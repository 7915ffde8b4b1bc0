//! Stepcast Project Model
//!
//! Defines the core data contracts shared by recording, review, and export:
//! - **Step:** one annotated screenshot plus capture metadata
//! - **StepSequence:** the ordered, editable list of steps that a session
//!   produces and an exporter renders
//!
//! Step coordinates are global desktop pixels, not display-local ones.

pub mod sequence;
pub mod step;

pub use sequence::*;
pub use step::*;
