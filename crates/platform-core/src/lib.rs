//! Stepcast platform core contracts.
//!
//! This crate contains cross-platform pointer and display data structures
//! used by the input, capture, and render crates without coupling to a
//! concrete OS backend. All positions are in the global desktop space: the
//! union of every display rectangle, where a display may sit at negative
//! coordinates.

use serde::{Deserialize, Serialize};

/// A pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, half-open on its right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from corner coordinates `[min_x, min_y, max_x, max_y)`.
    pub fn from_corners(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: (max_x as i64 - min_x as i64).max(0) as u32,
            height: (max_y as i64 - min_y as i64).max(0) as u32,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, point: Point) -> bool {
        let (px, py) = (point.x as i64, point.y as i64);
        px >= self.x as i64 && px < self.right() && py >= self.y as i64 && py < self.bottom()
    }

    /// Translate a global point into this rectangle's local coordinate space.
    pub fn to_local(&self, point: Point) -> Point {
        Point::new(
            point.x.saturating_sub(self.x),
            point.y.saturating_sub(self.y),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// One active display in the desktop layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    /// Position in the platform's display enumeration.
    pub index: usize,
    /// Bounds in global desktop pixels.
    pub rect: Rect,
    /// Monitor name/identifier.
    pub name: String,
    /// Whether this display is primary.
    pub primary: bool,
}

impl DisplayInfo {
    pub fn new(index: usize, rect: Rect) -> Self {
        Self {
            index,
            rect,
            name: format!("display-{index}"),
            primary: index == 0,
        }
    }
}

/// Snapshot of the active displays, ordered by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLayout {
    displays: Vec<DisplayInfo>,
}

impl DisplayLayout {
    pub fn new(mut displays: Vec<DisplayInfo>) -> Self {
        displays.sort_by_key(|d| d.index);
        Self { displays }
    }

    pub fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    /// First display (by index order) whose bounds contain `point`.
    pub fn find(&self, point: Point) -> Option<&DisplayInfo> {
        self.displays.iter().find(|d| d.rect.contains(point))
    }

    /// Bounds covering every display, or `None` for an empty layout.
    pub fn virtual_bounds(&self) -> Option<Rect> {
        let min_x = self.displays.iter().map(|d| d.rect.x).min()?;
        let min_y = self.displays.iter().map(|d| d.rect.y).min()?;
        let max_x = self.displays.iter().map(|d| d.rect.right()).max()?;
        let max_y = self.displays.iter().map(|d| d.rect.bottom()).max()?;
        Some(Rect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x as i64).max(0) as u32,
            height: (max_y - min_y as i64).max(0) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dual_layout() -> DisplayLayout {
        DisplayLayout::new(vec![
            DisplayInfo::new(0, Rect::from_corners(0, 0, 1920, 1080)),
            DisplayInfo::new(1, Rect::from_corners(1920, 0, 3840, 1080)),
        ])
    }

    #[test]
    fn find_resolves_owning_display() {
        let layout = dual_layout();
        assert_eq!(layout.find(Point::new(100, 100)).map(|d| d.index), Some(0));
        assert_eq!(layout.find(Point::new(2000, 100)).map(|d| d.index), Some(1));
        assert!(layout.find(Point::new(-5, -5)).is_none());
    }

    #[test]
    fn right_and_bottom_edges_are_exclusive() {
        let layout = dual_layout();
        assert_eq!(layout.find(Point::new(1919, 0)).map(|d| d.index), Some(0));
        assert_eq!(layout.find(Point::new(1920, 0)).map(|d| d.index), Some(1));
        assert!(layout.find(Point::new(100, 1080)).is_none());
        assert!(layout.find(Point::new(3840, 10)).is_none());
    }

    #[test]
    fn overlapping_layout_prefers_lowest_index() {
        let layout = DisplayLayout::new(vec![
            DisplayInfo::new(1, Rect::new(0, 0, 800, 600)),
            DisplayInfo::new(0, Rect::new(0, 0, 1920, 1080)),
        ]);
        assert_eq!(layout.find(Point::new(10, 10)).map(|d| d.index), Some(0));
    }

    #[test]
    fn to_local_handles_negative_origin() {
        let rect = Rect::new(-1920, -200, 1920, 1080);
        assert_eq!(rect.to_local(Point::new(-1900, -100)), Point::new(20, 100));
    }

    #[test]
    fn virtual_bounds_cover_negative_origin_layout() {
        let layout = DisplayLayout::new(vec![
            DisplayInfo::new(0, Rect::new(0, 0, 2560, 1440)),
            DisplayInfo::new(1, Rect::new(-1920, 0, 1920, 1080)),
        ]);
        assert_eq!(
            layout.virtual_bounds(),
            Some(Rect::new(-1920, 0, 4480, 1440))
        );
        assert_eq!(DisplayLayout::default().virtual_bounds(), None);
    }

    proptest! {
        #[test]
        fn contained_points_translate_inside_bounds(
            x in -4000i32..4000,
            y in -4000i32..4000,
            w in 1u32..4000,
            h in 1u32..4000,
            px in -9000i32..9000,
            py in -9000i32..9000,
        ) {
            let rect = Rect::new(x, y, w, h);
            let point = Point::new(px, py);
            if rect.contains(point) {
                let local = rect.to_local(point);
                prop_assert!(local.x >= 0 && (local.x as u32) < w);
                prop_assert!(local.y >= 0 && (local.y as u32) < h);
            }
        }
    }
}
