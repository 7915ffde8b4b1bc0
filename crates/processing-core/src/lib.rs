//! Stepcast Processing Core
//!
//! Pure image operations applied to captured screenshots. Currently this is
//! the click marker burned into every click-derived step.

pub mod marker;

pub use marker::*;
