//! Stepcast Common Utilities
//!
//! Shared infrastructure for all Stepcast crates:
//! - Error taxonomy and result alias
//! - Export format tag
//! - Session clock for monotonic step timestamps
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use format::*;
