//! Fonts for PDF pages.
//!
//! Text is set in a TrueType face embedded into the document, so any
//! character the face covers survives export. The face comes from an
//! explicit file or from the system's default sans-serif family.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::{Properties, Weight};
use font_kit::source::{Source, SystemSource};
use printpdf::{IndirectFontRef, PdfDocumentReference};
use rusttype::Scale;

use stepcast_common::error::{StepcastError, StepcastResult};

/// A TrueType face: raw bytes for embedding plus parsed metrics.
pub(crate) struct FontFace {
    data: Vec<u8>,
    metrics: rusttype::Font<'static>,
    /// Scale at which rusttype reports advances in font units.
    unit_scale: Scale,
    units_per_em: f64,
}

impl FontFace {
    pub(crate) fn from_bytes(data: Vec<u8>) -> StepcastResult<Self> {
        let metrics = rusttype::Font::try_from_vec(data.clone())
            .ok_or_else(|| StepcastError::encode("Font data is not a usable TrueType face"))?;
        let vertical = metrics.v_metrics_unscaled();
        let unit_scale = Scale::uniform(vertical.ascent - vertical.descent);
        let units_per_em = f64::from(metrics.units_per_em().max(1));

        Ok(Self {
            data,
            metrics,
            unit_scale,
            units_per_em,
        })
    }

    pub(crate) fn from_path(path: &Path) -> StepcastResult<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Advance width of `text` set at `size` points, without kerning.
    pub(crate) fn text_width(&self, text: &str, size: f64) -> f64 {
        let units: f64 = text
            .chars()
            .map(|c| {
                let advance = self
                    .metrics
                    .glyph(c)
                    .scaled(self.unit_scale)
                    .h_metrics()
                    .advance_width;
                f64::from(advance)
            })
            .sum();
        units * size / self.units_per_em
    }

    fn embed(&self, doc: &PdfDocumentReference) -> StepcastResult<IndirectFontRef> {
        doc.add_external_font(Cursor::new(self.data.as_slice()))
            .map_err(|e| StepcastError::encode(format!("Failed to embed font: {e}")))
    }
}

/// Regular and bold faces for one export.
pub(crate) struct FontSet {
    regular: FontFace,
    bold: Option<FontFace>,
}

impl FontSet {
    /// Load `custom` if given, otherwise the system sans-serif family.
    ///
    /// A custom file is used for every weight.
    pub(crate) fn load(custom: Option<&Path>) -> StepcastResult<Self> {
        if let Some(path) = custom {
            return Ok(Self {
                regular: FontFace::from_path(path)?,
                bold: None,
            });
        }

        let regular = system_face(&Properties::new())?;
        let bold = match system_face(Properties::new().weight(Weight::BOLD)) {
            Ok(face) => Some(face),
            Err(e) => {
                tracing::debug!(error = %e, "No bold system face, using regular for headings");
                None
            }
        };
        Ok(Self { regular, bold })
    }

    /// Embed the faces into `doc`.
    pub(crate) fn embed(&self, doc: &PdfDocumentReference) -> StepcastResult<DocumentFonts<'_>> {
        let regular = EmbeddedFont {
            face: &self.regular,
            handle: self.regular.embed(doc)?,
        };
        let bold = match &self.bold {
            Some(face) => EmbeddedFont {
                face,
                handle: face.embed(doc)?,
            },
            None => regular.clone(),
        };
        Ok(DocumentFonts { regular, bold })
    }
}

/// A face together with its handle inside one document.
#[derive(Clone)]
pub(crate) struct EmbeddedFont<'a> {
    pub face: &'a FontFace,
    pub handle: IndirectFontRef,
}

pub(crate) struct DocumentFonts<'a> {
    pub regular: EmbeddedFont<'a>,
    pub bold: EmbeddedFont<'a>,
}

fn system_face(properties: &Properties) -> StepcastResult<FontFace> {
    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], properties)
        .map_err(|e| StepcastError::encode(format!("No system sans-serif font: {e:?}")))?;

    let data = match handle {
        Handle::Path { path, .. } => {
            tracing::debug!(font = %path.display(), "Using system font");
            fs::read(&path)?
        }
        Handle::Memory { bytes, .. } => bytes.as_ref().clone(),
    };
    FontFace::from_bytes(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_regular() -> FontFace {
        FontSet::load(None).unwrap().regular
    }

    #[test]
    fn widths_scale_with_size() {
        let face = system_regular();
        let small = face.text_width("Click Save", 10.0);
        assert!(small > 0.0);
        assert!((face.text_width("Click Save", 20.0) - 2.0 * small).abs() < 1e-6);
        assert_eq!(face.text_width("", 12.0), 0.0);
    }

    #[test]
    fn wide_glyphs_measure_wider() {
        let face = system_regular();
        assert!(face.text_width("WWWW", 12.0) > face.text_width("iiii", 12.0));
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(matches!(
            FontFace::from_bytes(b"not a font".to_vec()),
            Err(StepcastError::EncodeFailed { .. })
        ));
    }

    #[test]
    fn missing_custom_font_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ttf");
        assert!(matches!(
            FontSet::load(Some(&missing)),
            Err(StepcastError::Io(_))
        ));
    }
}
