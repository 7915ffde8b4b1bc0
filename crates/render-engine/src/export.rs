//! Exporter contract and format registry.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;

use stepcast_common::config::AppConfig;
use stepcast_common::error::{StepcastError, StepcastResult};
use stepcast_common::format::ExportFormat;
use stepcast_project_model::StepSequence;

use crate::html::HtmlExporter;
use crate::pdf::PdfExporter;

/// Document-level settings shared by all backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Document heading. The first capture time is appended to it.
    pub title: String,

    /// Emit a title page before the steps (PDF only).
    pub cover_page: bool,

    /// TrueType font for PDF text. `None` picks the system sans-serif face.
    pub font: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Step Recording".to_string(),
            cover_page: true,
            font: None,
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            title: config.document_title.clone(),
            cover_page: config.cover_page,
            font: config.pdf_font.clone(),
        }
    }
}

/// A document backend.
///
/// Implementations read the sequence without mutating it and must leave no
/// new files behind when they return an error.
pub trait Exporter: Send + Sync {
    /// Format this backend writes.
    fn format(&self) -> ExportFormat;

    /// Write `steps` to `path`.
    fn save(
        &self,
        steps: &StepSequence,
        path: &Path,
        options: &ExportOptions,
    ) -> StepcastResult<()>;
}

/// Backend for a format tag.
pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Html => Box::new(HtmlExporter),
        ExportFormat::Pdf => Box::new(PdfExporter),
    }
}

/// Export `steps` to `path` in the given format.
///
/// This is the main entry point for exporting.
pub fn save(
    steps: &StepSequence,
    path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> StepcastResult<()> {
    ensure_not_empty(steps)?;

    tracing::info!(
        output = %path.display(),
        format = %format,
        steps = steps.len(),
        "Starting export"
    );
    let started = Instant::now();

    let exporter = exporter_for(format);
    if let Err(e) = exporter.save(steps, path, options) {
        tracing::warn!(error = %e, output = %path.display(), "Export failed");
        return Err(e);
    }

    tracing::info!(
        output = %path.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Export complete"
    );
    Ok(())
}

/// Export using a textual format tag such as `"html"` or `"PDF"`.
pub fn save_tagged(
    steps: &StepSequence,
    path: &Path,
    tag: &str,
    options: &ExportOptions,
) -> StepcastResult<()> {
    let format: ExportFormat = tag.parse()?;
    save(steps, path, format, options)
}

pub(crate) fn ensure_not_empty(steps: &StepSequence) -> StepcastResult<()> {
    if steps.is_empty() {
        return Err(StepcastError::NoStepsRecorded);
    }
    Ok(())
}

/// Lossless PNG bytes for a screenshot.
pub(crate) fn encode_png(image: &RgbaImage) -> StepcastResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| StepcastError::encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_format() {
        for format in ExportFormat::ALL {
            assert_eq!(exporter_for(format).format(), format);
        }
    }

    #[test]
    fn unknown_tag_is_rejected_before_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let err = save_tagged(&StepSequence::new(), &path, "docx", &ExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, StepcastError::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn options_follow_config() {
        let config = AppConfig {
            document_title: "Onboarding".to_string(),
            cover_page: false,
            pdf_font: Some(PathBuf::from("/fonts/NotoSans.ttf")),
            ..AppConfig::default()
        };
        let options = ExportOptions::from_config(&config);
        assert_eq!(options.title, "Onboarding");
        assert!(!options.cover_page);
        assert_eq!(options.font, Some(PathBuf::from("/fonts/NotoSans.ttf")));
    }

    #[test]
    fn png_encoding_is_stable() {
        let image = RgbaImage::from_fn(17, 9, |x, y| image::Rgba([x as u8, y as u8, 3, 255]));
        let first = encode_png(&image).unwrap();
        assert_eq!(first, encode_png(&image).unwrap());
        assert_eq!(&first[..8], b"\x89PNG\r\n\x1a\n");
    }
}
