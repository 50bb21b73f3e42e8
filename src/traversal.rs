//! Raster traversal: turning a canvas into single-step d-pad moves
//!
//! Two walks are supported. The zig-zag walk covers two rows per sweep,
//! alternating sweep direction every row pair, and never sends the same
//! direction twice in a row inside a sweep (the console accelerates the
//! cursor on repeated identical steps). The simple walk is a plain
//! boustrophedon over single rows with a released tick between moves.
//!
//! Both share the cursor model: ink is decided at the cursor *before* the
//! tick's move, then the cursor follows the hat that was sent.

use pokken_report::Hat;
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;

/// Which walk to use over the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Two rows per sweep, no repeated directions; roughly twice as fast
    #[default]
    ZigZag,
    /// One row per sweep with a stop between every move
    Simple,
}

/// Logical cursor on the remote canvas.
///
/// Signed so it can step outside the canvas at the edges; callers must go
/// through [`Canvas::get`] which refuses out-of-range reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
}

impl Cursor {
    pub const ORIGIN: Cursor = Cursor { x: 0, y: 0 };

    /// Follow one hat step (diagonals move on both axes)
    pub fn apply(&mut self, hat: Hat) {
        self.x += hat.dx();
        self.y += hat.dy();
    }

    pub fn in_bounds(&self, canvas: &Canvas) -> bool {
        canvas.get(self.x, self.y).is_some()
    }
}

/// Ink decision: only true for an in-range cursor over a set pixel
pub fn ink_at(canvas: &Canvas, cursor: Cursor) -> bool {
    canvas.get(cursor.x, cursor.y).unwrap_or(false)
}

/// Ticks in one zig-zag sweep over a row pair (642 for a 320 wide canvas)
pub const fn window_len(width: u32) -> u32 {
    2 * width + 2
}

/// Direction for tick `tick` of a zig-zag sweep.
///
/// Odd ticks step sideways (rightward when `y mod 4 < 2`, else leftward),
/// ticks divisible by four step down, the other even ticks step up. The last
/// three ticks of the window are forced to down / released / down, which
/// lands the cursor on the next row pair without two identical steps.
pub fn zigzag_direction(tick: u32, window: u32, y: i32) -> Hat {
    if tick + 3 == window || tick + 1 == window {
        return Hat::Down;
    }
    if tick + 2 == window {
        return Hat::Center;
    }

    if tick % 2 == 1 {
        if y.rem_euclid(4) < 2 {
            Hat::Right
        } else {
            Hat::Left
        }
    } else if tick % 4 == 0 {
        Hat::Down
    } else {
        Hat::Up
    }
}

/// Direction of a simple-walk horizontal move: right on even rows, left on odd
pub fn simple_row_direction(y: i32) -> Hat {
    if y.rem_euclid(2) == 1 {
        Hat::Left
    } else {
        Hat::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(width: u32, y: i32) -> Vec<Hat> {
        let n = window_len(width);
        (0..n).map(|t| zigzag_direction(t, n, y)).collect()
    }

    #[test]
    fn test_window_len() {
        assert_eq!(window_len(320), 642);
        assert_eq!(window_len(8), 18);
    }

    #[test]
    fn test_window_shape() {
        let w = window(4, 0);
        assert_eq!(
            w,
            vec![
                Hat::Down,
                Hat::Right,
                Hat::Up,
                Hat::Right,
                Hat::Down,
                Hat::Right,
                Hat::Up,
                Hat::Down,
                Hat::Center,
                Hat::Down,
            ]
        );
    }

    #[test]
    fn test_tail_of_full_width_window() {
        let n = window_len(320);
        assert_eq!(zigzag_direction(638, n, 0), Hat::Up);
        assert_eq!(zigzag_direction(639, n, 1), Hat::Down);
        assert_eq!(zigzag_direction(640, n, 1), Hat::Center);
        assert_eq!(zigzag_direction(641, n, 1), Hat::Down);
    }

    #[test]
    fn test_sweep_direction_alternates_per_row_pair() {
        assert_eq!(zigzag_direction(1, 18, 1), Hat::Right);
        assert_eq!(zigzag_direction(1, 18, 3), Hat::Left);
        assert_eq!(zigzag_direction(1, 18, 5), Hat::Right);
    }

    #[test]
    fn test_no_repeats_inside_window() {
        for width in [2, 4, 8, 320] {
            for y in [0, 2] {
                let w = window(width, y);
                for pair in w.windows(2) {
                    assert_ne!(pair[0], pair[1], "width {width}: repeated {:?}", pair[0]);
                }
            }
        }
    }

    #[test]
    fn test_sweep_visits_both_rows_of_every_column() {
        let canvas = Canvas::blank(8, 2).unwrap();
        let n = window_len(8);
        let mut cursor = Cursor::ORIGIN;
        let mut visited = std::collections::HashSet::new();
        for t in 0..n {
            if cursor.in_bounds(&canvas) {
                visited.insert((cursor.x, cursor.y));
            }
            cursor.apply(zigzag_direction(t, n, cursor.y));
        }
        assert_eq!(visited.len(), 16);
        assert_eq!(cursor, Cursor { x: 7, y: 2 });
    }

    #[test]
    fn test_cursor_follows_diagonals() {
        let mut c = Cursor::ORIGIN;
        c.apply(Hat::DownRight);
        c.apply(Hat::DownRight);
        c.apply(Hat::UpLeft);
        assert_eq!(c, Cursor { x: 1, y: 1 });
        c.apply(Hat::Left);
        c.apply(Hat::Left);
        assert_eq!(c, Cursor { x: -1, y: 1 });
    }

    #[test]
    fn test_ink_at_out_of_range_is_false() {
        let canvas = Canvas::from_ascii("##\n##\n").unwrap();
        assert!(ink_at(&canvas, Cursor { x: 1, y: 1 }));
        assert!(!ink_at(&canvas, Cursor { x: 2, y: 1 }));
        assert!(!ink_at(&canvas, Cursor { x: 0, y: -1 }));
    }

    #[test]
    fn test_simple_row_direction() {
        assert_eq!(simple_row_direction(0), Hat::Right);
        assert_eq!(simple_row_direction(1), Hat::Left);
        assert_eq!(simple_row_direction(2), Hat::Right);
    }
}
