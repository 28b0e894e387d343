// Geometry - Rectangles and grid settings for the composition pane
// Coordinates are integer pane units: x is time (ticks), y is the pitch row

use crate::config::EditorConfig;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle occupied by a sound object on the pane
///
/// `x` is the start time, `width` the duration. `y` and `height` place the
/// object on the pitch rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns this rectangle shifted by the given offsets
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Smallest rectangle covering both `self` and `other`
    pub fn union(&self, other: &Rect) -> Self {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Union over a sequence of rectangles, `None` when the sequence is empty
    pub fn union_all<I>(rects: I) -> Option<Self>
    where
        I: IntoIterator<Item = Rect>,
    {
        rects.into_iter().reduce(|acc, r| acc.union(&r))
    }

    /// Check whether a point lies inside this rectangle
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check whether `other` lies entirely inside this rectangle (edges may touch)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check whether the two rectangles overlap
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Normalised rectangle spanning two corner points (e.g. a rubber band)
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let left = x0.min(x1);
        let top = y0.min(y1);
        Self::new(left, top, (x1 - x0).abs(), (y1 - y0).abs())
    }
}

/// Highest MIDI pitch, placed on the top row of the pane
const TOP_PITCH: i32 = 127;

/// Grid and pane settings used by tree operations
///
/// This is the subset of [`EditorConfig`] the sound object tree needs for
/// snapping, length clamping, edge checks and pitch derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Horizontal snap distance
    pub snap_x: i32,
    /// Height of one pitch row (also the height of a note)
    pub row_height: i32,
    /// A note must stay strictly longer than this
    pub min_note_length: i32,
    /// Pane width (time axis extent)
    pub pane_width: i32,
    /// Pane height (pitch axis extent)
    pub pane_height: i32,
}

impl Grid {
    /// Round `value` to the nearest multiple of `step`
    fn snap(value: i32, step: i32) -> i32 {
        if step <= 0 {
            return value;
        }
        let rounded = (value as f64 / step as f64).round() as i32;
        rounded * step
    }

    /// Snap an x coordinate to the horizontal grid
    pub fn snap_x(&self, x: i32) -> i32 {
        Self::snap(x, self.snap_x)
    }

    /// Snap a y coordinate to the nearest pitch row
    pub fn snap_y(&self, y: i32) -> i32 {
        Self::snap(y, self.row_height)
    }

    /// MIDI pitch for a row coordinate (top row = 127)
    pub fn pitch_for_y(&self, y: i32) -> u8 {
        let row = if self.row_height > 0 {
            y.div_euclid(self.row_height)
        } else {
            0
        };
        (TOP_PITCH - row).clamp(0, TOP_PITCH) as u8
    }

    /// Row coordinate for a MIDI pitch (inverse of [`Grid::pitch_for_y`])
    pub fn y_for_pitch(&self, pitch: u8) -> i32 {
        (TOP_PITCH - pitch.min(127) as i32) * self.row_height
    }

    /// The full pane rectangle
    pub fn pane(&self) -> Rect {
        Rect::new(0, 0, self.pane_width, self.pane_height)
    }

    /// Quantise a raw pointer delta to whole grid steps
    ///
    /// Returns 0 until the pointer has travelled at least half a step, then a
    /// multiple of `step`.
    pub fn quantize_delta(delta: i32, step: i32) -> i32 {
        if step <= 0 {
            return delta;
        }
        let steps = (delta as f64 / step as f64).round() as i32;
        steps * step
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for Grid {
    fn from(config: &EditorConfig) -> Self {
        Self {
            snap_x: config.snap_x,
            row_height: config.row_height,
            min_note_length: config.min_note_length,
            pane_width: config.pane_width,
            pane_height: config.pane_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 10);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 30);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0, 50, 100, 10);
        let b = Rect::new(200, 20, 100, 10);
        let u = a.union(&b);

        assert_eq!(u, Rect::new(0, 20, 300, 40));
        assert!(u.contains_rect(&a));
        assert!(u.contains_rect(&b));
    }

    #[test]
    fn test_union_all_empty() {
        assert_eq!(Rect::union_all(Vec::new()), None);
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let r = Rect::new(0, 0, 100, 10);
        assert!(r.contains_point(0, 0));
        assert!(r.contains_point(99, 9));
        assert!(!r.contains_point(100, 5));
        assert!(!r.contains_point(50, 10));
    }

    #[test]
    fn test_intersects() {
        let a = Rect::new(0, 0, 100, 10);
        assert!(a.intersects(&Rect::new(50, 5, 100, 10)));
        // Touching edges do not overlap
        assert!(!a.intersects(&Rect::new(100, 0, 10, 10)));
    }

    #[test]
    fn test_from_corners_normalises() {
        let r = Rect::from_corners(100, 50, 20, 10);
        assert_eq!(r, Rect::new(20, 10, 80, 40));
    }

    #[test]
    fn test_grid_snapping() {
        let grid = Grid::default();

        assert_eq!(grid.snap_x(29), 20);
        assert_eq!(grid.snap_x(30), 40);
        assert_eq!(grid.snap_y(64), 60);
        assert_eq!(grid.snap_y(65), 70);
    }

    #[test]
    fn test_pitch_mapping() {
        let grid = Grid::default();

        assert_eq!(grid.pitch_for_y(0), 127);
        assert_eq!(grid.pitch_for_y(60), 121);
        assert_eq!(grid.y_for_pitch(60), 670);
        assert_eq!(grid.pitch_for_y(grid.y_for_pitch(60)), 60);
        // Below the lowest row clamps to pitch 0
        assert_eq!(grid.pitch_for_y(5000), 0);
    }

    #[test]
    fn test_quantize_delta() {
        assert_eq!(Grid::quantize_delta(9, 20), 0);
        assert_eq!(Grid::quantize_delta(10, 20), 20);
        assert_eq!(Grid::quantize_delta(-31, 20), -40);
        assert_eq!(Grid::quantize_delta(7, 10), 10);
    }
}
