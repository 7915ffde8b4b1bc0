//! PDF document backend.
//!
//! One A4 page per step, optionally preceded by a cover page. Each step page
//! carries a header, an optional description banner and the screenshot.
//! Pages are built with `printpdf` in an embedded TrueType face, and the
//! finished file is written to `<path>.partial` before being renamed into
//! place.

mod fonts;
mod layout;

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use printpdf::path::PaintMode;
use printpdf::{
    image_crate, Color, Image, ImageTransform, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex, Rect, Rgb,
};

use stepcast_common::error::{StepcastError, StepcastResult};
use stepcast_common::format::ExportFormat;
use stepcast_project_model::{Step, StepSequence};

use crate::artifacts::ArtifactGuard;
use crate::export::{ensure_not_empty, ExportOptions, Exporter};

use self::fonts::{DocumentFonts, EmbeddedFont, FontSet};
use self::layout::{
    place_image, wrap_text, Placement, CONTENT_TOP, CONTENT_WIDTH, MARGIN, PAGE_HEIGHT,
    PAGE_WIDTH,
};

const LAYER_NAME: &str = "Content";

const HEADER_SIZE: f64 = 14.0;
const META_SIZE: f64 = 9.0;
const HEADER_HEIGHT: f64 = 36.0;

const BANNER_SIZE: f64 = 11.0;
const BANNER_LINE_HEIGHT: f64 = 14.0;
const BANNER_PADDING: f64 = 6.0;
const BANNER_MAX_LINES: usize = 20;
const BLOCK_GAP: f64 = 8.0;

/// Writes a paginated PDF with one screenshot per page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl Exporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn save(
        &self,
        steps: &StepSequence,
        path: &Path,
        options: &ExportOptions,
    ) -> StepcastResult<()> {
        ensure_not_empty(steps)?;
        let bytes = render_document(steps, options)?;
        write_document(path, &bytes)?;

        tracing::debug!(
            output = %path.display(),
            bytes = bytes.len(),
            "PDF document written"
        );
        Ok(())
    }
}

/// Hands out one layer per page, starting with the document's first page.
struct Pages<'a> {
    doc: &'a PdfDocumentReference,
    first: Option<(PdfPageIndex, PdfLayerIndex)>,
    count: usize,
}

impl Pages<'_> {
    fn next_page(&mut self) -> PdfLayerReference {
        let (page, layer) = match self.first.take() {
            Some(first) => first,
            None => self
                .doc
                .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME),
        };
        self.count += 1;
        self.doc.get_page(page).get_layer(layer)
    }
}

fn render_document(steps: &StepSequence, options: &ExportOptions) -> StepcastResult<Vec<u8>> {
    let first_capture = steps
        .at(0)
        .map(|step| step.timestamp)
        .ok_or(StepcastError::NoStepsRecorded)?;

    let font_set = FontSet::load(options.font.as_deref())?;
    let (doc, page, layer) = PdfDocument::new(
        options.title.clone(),
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        LAYER_NAME,
    );
    let fonts = font_set.embed(&doc)?;

    let mut pages = Pages {
        doc: &doc,
        first: Some((page, layer)),
        count: 0,
    };

    if options.cover_page {
        let canvas = pages.next_page();
        cover_page(&canvas, &fonts, &options.title, first_capture, steps.len());
    }

    for (index, step) in steps.iter().enumerate() {
        let canvas = pages.next_page();
        step_page(&canvas, &fonts, index + 1, step)?;
    }

    tracing::debug!(pages = pages.count, "PDF pages laid out");
    serialize(doc)
}

fn serialize(doc: PdfDocumentReference) -> StepcastResult<Vec<u8>> {
    let mut buffer = BufWriter::new(Vec::new());
    doc.save(&mut buffer)
        .map_err(|e| StepcastError::encode(format!("Failed to serialize PDF: {e}")))?;
    buffer
        .into_inner()
        .map_err(|e| StepcastError::encode(format!("Failed to flush PDF: {e}")))
}

/// Points to printpdf millimetres.
fn mm(points: f64) -> Mm {
    Mm((points * 25.4 / 72.0) as f32)
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    let channel = |v: u8| f32::from(v) / 255.0;
    Color::Rgb(Rgb::new(channel(r), channel(g), channel(b), None))
}

fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Set one line of text with its baseline at `(x, y)`.
fn text(
    canvas: &PdfLayerReference,
    font: &EmbeddedFont<'_>,
    size: f64,
    (x, y): (f64, f64),
    color: Color,
    line: &str,
) {
    canvas.set_fill_color(color);
    canvas.use_text(line, size as f32, mm(x), mm(y), &font.handle);
}

fn cover_page(
    canvas: &PdfLayerReference,
    fonts: &DocumentFonts<'_>,
    title: &str,
    first_capture: DateTime<Utc>,
    step_count: usize,
) {
    let black = rgb(0, 0, 0);
    let mut y = CONTENT_TOP - 24.0;
    text(canvas, &fonts.bold, 24.0, (MARGIN, y), black.clone(), title);

    y -= 28.0;
    let recorded = format!("Recorded {}", format_time(first_capture));
    text(canvas, &fonts.regular, 12.0, (MARGIN, y), black.clone(), &recorded);

    y -= 18.0;
    let noun = if step_count == 1 { "step" } else { "steps" };
    let count = format!("{step_count} {noun}");
    text(canvas, &fonts.regular, 12.0, (MARGIN, y), black, &count);
}

fn step_page(
    canvas: &PdfLayerReference,
    fonts: &DocumentFonts<'_>,
    position: usize,
    step: &Step,
) -> StepcastResult<()> {
    let mut cursor = CONTENT_TOP;

    let header = format!("Step {position}");
    let header_at = (MARGIN, cursor - HEADER_SIZE);
    text(canvas, &fonts.bold, HEADER_SIZE, header_at, rgb(0, 0, 0), &header);

    let meta = format!(
        "{} at ({}, {}) - {}",
        step.action.label(),
        step.coordinates.x,
        step.coordinates.y,
        format_time(step.timestamp)
    );
    let meta_at = (MARGIN, cursor - HEADER_SIZE - 14.0);
    text(canvas, &fonts.regular, META_SIZE, meta_at, rgb(102, 102, 102), &meta);
    cursor -= HEADER_HEIGHT;

    if let Some(note) = step.description_text() {
        cursor -= description_banner(canvas, &fonts.regular, note, cursor) + BLOCK_GAP;
    }

    let placed = place_image(step.width(), step.height(), cursor);
    draw_screenshot(canvas, &step.screenshot, placed)
}

/// Wrapped banner text, capped at [`BANNER_MAX_LINES`].
fn banner_lines(note: &str, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = wrap_text(
        &format!("Note: {note}"),
        CONTENT_WIDTH - 2.0 * BANNER_PADDING,
        measure,
    );
    if lines.len() > BANNER_MAX_LINES {
        lines.truncate(BANNER_MAX_LINES);
        if let Some(last) = lines.last_mut() {
            last.push_str(" ...");
        }
    }
    lines
}

fn banner_height(line_count: usize) -> f64 {
    line_count as f64 * BANNER_LINE_HEIGHT + 2.0 * BANNER_PADDING
}

/// Draw the light-blue note banner below `top`. Returns its height.
fn description_banner(
    canvas: &PdfLayerReference,
    font: &EmbeddedFont<'_>,
    note: &str,
    top: f64,
) -> f64 {
    let lines = banner_lines(note, |line| font.face.text_width(line, BANNER_SIZE));
    let height = banner_height(lines.len());

    canvas.set_fill_color(rgb(227, 242, 253));
    canvas.add_rect(
        Rect::new(
            mm(MARGIN),
            mm(top - height),
            mm(MARGIN + CONTENT_WIDTH),
            mm(top),
        )
        .with_mode(PaintMode::Fill),
    );

    let mut baseline = top - BANNER_PADDING - BANNER_SIZE;
    for line in &lines {
        let at = (MARGIN + BANNER_PADDING, baseline);
        text(canvas, font, BANNER_SIZE, at, rgb(0, 0, 0), line);
        baseline -= BANNER_LINE_HEIGHT;
    }
    height
}

/// Place the screenshot at `placed`, flattened to RGB.
fn draw_screenshot(
    canvas: &PdfLayerReference,
    screenshot: &RgbaImage,
    placed: Placement,
) -> StepcastResult<()> {
    let flattened: RgbImage = screenshot.convert();
    let (width, height) = flattened.dimensions();
    let pixels = image_crate::RgbImage::from_raw(width, height, flattened.into_raw())
        .ok_or_else(|| StepcastError::encode("Screenshot buffer does not match its size"))?;

    let image = Image::from_dynamic_image(&image_crate::DynamicImage::ImageRgb8(pixels));
    // At 72 dpi one pixel is one point before scaling.
    image.add_to_layer(
        canvas.clone(),
        ImageTransform {
            translate_x: Some(mm(placed.x)),
            translate_y: Some(mm(placed.y)),
            scale_x: Some((placed.width / f64::from(width.max(1))) as f32),
            scale_y: Some((placed.height / f64::from(height.max(1))) as f32),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
    Ok(())
}

fn partial_path(path: &Path) -> StepcastResult<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file path", path.display()),
            )
        })?
        .to_os_string();
    name.push(".partial");
    Ok(path.with_file_name(name))
}

/// Write `bytes` next to `path` and rename into place.
fn write_document(path: &Path, bytes: &[u8]) -> StepcastResult<()> {
    let partial = partial_path(path)?;

    let mut guard = ArtifactGuard::new();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        guard.create_dir_all(parent)?;
    }
    guard.write(&partial, bytes)?;
    fs::rename(&partial, path)?;
    guard.commit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monospace(line: &str) -> f64 {
        line.chars().count() as f64 * 6.0
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/tmp/out/guide.pdf")).unwrap(),
            PathBuf::from("/tmp/out/guide.pdf.partial")
        );
        assert!(partial_path(Path::new("/")).is_err());
    }

    #[test]
    fn long_descriptions_are_capped() {
        let lines = banner_lines(&"word ".repeat(2000), monospace);
        assert_eq!(lines.len(), BANNER_MAX_LINES);
        assert!(lines[BANNER_MAX_LINES - 1].ends_with(" ..."));
        assert!(
            (banner_height(lines.len())
                - (BANNER_MAX_LINES as f64 * BANNER_LINE_HEIGHT + 2.0 * BANNER_PADDING))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn short_descriptions_keep_their_prefix() {
        assert_eq!(
            banner_lines("Open settings", monospace),
            vec!["Note: Open settings".to_string()]
        );
    }

    #[test]
    fn points_convert_to_millimetres() {
        assert!((mm(PAGE_WIDTH).0 - 210.0).abs() < 0.01);
        assert!((mm(PAGE_HEIGHT).0 - 297.0).abs() < 0.01);
    }

    #[test]
    fn failed_rename_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("guide.pdf");
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(write_document(&target, b"%PDF-1.4").is_err());
        assert!(!dir.path().join("guide.pdf.partial").exists());
        assert!(target.join("keep").exists());
    }
}
