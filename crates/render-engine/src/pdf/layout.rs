//! Page geometry and line wrapping.
//!
//! All values are PDF points (1/72 in). The origin is the bottom-left page
//! corner.

/// A4 portrait.
pub(crate) const PAGE_WIDTH: f64 = 595.28;
pub(crate) const PAGE_HEIGHT: f64 = 841.89;

/// 10 mm on every side.
pub(crate) const MARGIN: f64 = 28.35;

pub(crate) const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

/// Top edge of the content area.
pub(crate) const CONTENT_TOP: f64 = PAGE_HEIGHT - MARGIN;

/// Where an image lands on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Place an image directly below `top`.
///
/// The image fills the content width with its height following the pixel
/// aspect ratio. If that would run past the bottom margin, both dimensions
/// shrink by the same factor and the image is centered horizontally.
pub(crate) fn place_image(pixel_width: u32, pixel_height: u32, top: f64) -> Placement {
    let available = (top - MARGIN).max(0.0);
    let ratio = pixel_height as f64 / pixel_width.max(1) as f64;

    let mut width = CONTENT_WIDTH;
    let mut height = CONTENT_WIDTH * ratio;
    if height > available {
        let scale = available / height;
        width *= scale;
        height *= scale;
    }

    Placement {
        x: MARGIN + (CONTENT_WIDTH - width) / 2.0,
        y: top - height,
        width,
        height,
    }
}

/// Greedy word wrap to `max_width`, measuring with `measure`.
///
/// Explicit newlines start a new line. Words wider than a whole line are
/// broken between characters.
pub(crate) fn wrap_text(
    text: &str,
    max_width: f64,
    measure: impl Fn(&str) -> f64,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let mut next = current.clone();
                    next.push(c);
                    if !current.is_empty() && measure(&next) > max_width {
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    } else {
                        current = next;
                    }
                }
            }
        }
        lines.push(current);
    }

    lines
}
