//! Stepcast Render Engine
//!
//! Turns a finished [`StepSequence`](stepcast_project_model::StepSequence)
//! into a shareable document.
//!
//! # Export Architecture
//!
//! ```text
//! StepSequence ──┐
//!                ├── exporter_for(format)
//! ExportFormat ──┘         │
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!          HtmlExporter         PdfExporter
//!                │                   │
//!     step_<n>.png + index      printpdf (A4 pages,
//!                │              embedded TrueType font)
//!                ▼                   ▼
//!          <out>.html +         <out>.pdf.partial
//!          images/                   │ rename
//!                                    ▼
//!                                <out>.pdf
//! ```
//!
//! Every backend rejects an empty sequence before touching the filesystem
//! and removes whatever it created if a later step fails.

mod artifacts;
pub mod export;
pub mod html;
pub mod pdf;

pub use export::*;
pub use html::HtmlExporter;
pub use pdf::PdfExporter;
