//! HTML document backend.
//!
//! Layout on disk:
//!
//! ```text
//! <dir>/<name>.html
//! <dir>/images/step_1.png
//! <dir>/images/step_2.png
//! ...
//! ```
//!
//! Image names follow the current sequence position, so a reordered or
//! trimmed sequence is renumbered on every export.

use std::fs;
use std::path::{Path, PathBuf};

use stepcast_common::error::StepcastResult;
use stepcast_common::format::ExportFormat;
use stepcast_project_model::{Step, StepSequence};

use crate::artifacts::ArtifactGuard;
use crate::export::{encode_png, ensure_not_empty, ExportOptions, Exporter};

const IMAGES_DIR: &str = "images";

const STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f5f5f5;
        }
        .step {
            background-color: white;
            border-radius: 8px;
            padding: 20px;
            margin-bottom: 20px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .step-header {
            margin-bottom: 10px;
        }
        .step-header h2 {
            margin: 0 0 4px 0;
        }
        .meta {
            color: #666;
            font-size: 0.9em;
        }
        .description {
            margin-top: 10px;
            padding: 10px;
            background-color: #e3f2fd;
            border-radius: 4px;
        }
        .screenshot {
            max-width: 100%;
            height: auto;
            border: 1px solid #ddd;
            border-radius: 4px;
            margin-top: 10px;
        }
"#;

/// Writes an HTML page plus one PNG per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExporter;

impl Exporter for HtmlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn save(
        &self,
        steps: &StepSequence,
        path: &Path,
        options: &ExportOptions,
    ) -> StepcastResult<()> {
        ensure_not_empty(steps)?;

        let output_dir = parent_dir(path);
        let images_dir = output_dir.join(IMAGES_DIR);

        let mut guard = ArtifactGuard::new();
        guard.create_dir_all(&images_dir)?;

        for (index, step) in steps.iter().enumerate() {
            let png = encode_png(&step.screenshot)?;
            guard.write(&images_dir.join(image_file_name(index + 1)), &png)?;
        }

        let document = render_document(steps, options);
        guard.write(path, document.as_bytes())?;

        prune_stale_images(&images_dir, steps.len());
        guard.commit();

        tracing::debug!(
            output = %path.display(),
            images = steps.len(),
            "HTML document written"
        );
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn image_file_name(position: usize) -> String {
    format!("step_{position}.png")
}

/// Position encoded in a `step_<n>.png` file name.
fn image_position(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("step_")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Remove `step_<m>.png` files left by an earlier, longer export.
fn prune_stale_images(images_dir: &Path, count: usize) {
    let entries = match fs::read_dir(images_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %images_dir.display(), error = %e, "Failed to scan images directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(position) = name.to_str().and_then(image_position) else {
            continue;
        };
        if position > count {
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Pruned stale step image"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to prune stale step image"),
            }
        }
    }
}

fn render_document(steps: &StepSequence, options: &ExportOptions) -> String {
    let heading = match steps.at(0) {
        Some(first) => format!(
            "{} - {}",
            options.title,
            first.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => options.title.clone(),
    };
    let heading = escape_html(&heading);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str(&format!("    <title>{heading}</title>\n"));
    html.push_str("    <style>\n");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");
    html.push_str(&format!("    <h1>{heading}</h1>\n"));

    for (index, step) in steps.iter().enumerate() {
        render_step(&mut html, index + 1, step);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_step(html: &mut String, position: usize, step: &Step) {
    html.push_str(&format!("    <div class=\"step\" id=\"step-{position}\">\n"));
    html.push_str("        <div class=\"step-header\">\n");
    html.push_str(&format!("            <h2>Step {position}</h2>\n"));
    html.push_str(&format!(
        "            <div class=\"meta\">{} at ({}, {}) - {}</div>\n",
        escape_html(step.action.label()),
        step.coordinates.x,
        step.coordinates.y,
        step.timestamp.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
    ));
    html.push_str("        </div>\n");

    if let Some(text) = step.description_text() {
        html.push_str(&format!(
            "        <div class=\"description\">{}</div>\n",
            escape_html(text).replace('\n', "<br>\n")
        ));
    }

    html.push_str(&format!(
        "        <img class=\"screenshot\" src=\"{IMAGES_DIR}/{}\" alt=\"Screenshot of step {position}\" width=\"{}\" height=\"{}\">\n",
        image_file_name(position),
        step.width(),
        step.height(),
    ));
    html.push_str("    </div>\n");
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn parses_only_step_image_names() {
        assert_eq!(image_position("step_12.png"), Some(12));
        assert_eq!(image_position("step_.png"), None);
        assert_eq!(image_position("step_3.jpg"), None);
        assert_eq!(image_position("logo.png"), None);
    }

    #[test]
    fn bare_file_name_writes_next_to_it() {
        assert_eq!(parent_dir(Path::new("guide.html")), PathBuf::from("."));
        assert_eq!(
            parent_dir(Path::new("/tmp/out/guide.html")),
            PathBuf::from("/tmp/out")
        );
    }
}
