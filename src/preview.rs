//! Offline preview of what a raster run paints
//!
//! [`RemoteCanvas`] plays the console's side of the drawing screen: it
//! watches the report stream and moves a brush the way the game does. Feeding
//! it a raster sequencer's output shows whether the traversal reproduces the
//! source canvas without touching hardware.

use pokken_report::{Button, InputReport, STICK_MIN};

use crate::canvas::{Canvas, CanvasError};
use crate::sequencer::{Payload, Phase, Sequencer, SequencerConfig};
use crate::timing::Timing;
use crate::traversal::Cursor;

/// Simulated drawing screen
#[derive(Debug, Clone)]
pub struct RemoteCanvas {
    painted: Canvas,
    brush: Cursor,
    ink_button: Button,
    clear_button: Button,
}

impl RemoteCanvas {
    pub fn new(
        width: u32,
        height: u32,
        ink_button: Button,
        clear_button: Button,
    ) -> Result<Self, CanvasError> {
        Ok(Self {
            painted: Canvas::blank(width, height)?,
            brush: Cursor::ORIGIN,
            ink_button,
            clear_button,
        })
    }

    /// Apply one logical report.
    ///
    /// A stick pinned to the top-left corner parks the brush at the origin,
    /// the clear button wipes the screen, the ink button marks the brush
    /// position, then the hat moves the brush (clamped to the canvas).
    pub fn apply(&mut self, report: &InputReport) {
        if report.left_stick() == (STICK_MIN, STICK_MIN) {
            self.brush = Cursor::ORIGIN;
        }
        if report.is_pressed(self.clear_button) {
            self.painted.clear();
        }
        if report.is_pressed(self.ink_button) {
            self.painted.set(self.brush.x, self.brush.y, true);
        }

        let hat = report.hat();
        let max_x = self.painted.width() as i32 - 1;
        let max_y = self.painted.height() as i32 - 1;
        self.brush.x = (self.brush.x + hat.dx()).clamp(0, max_x);
        self.brush.y = (self.brush.y + hat.dy()).clamp(0, max_y);
    }

    pub fn brush(&self) -> Cursor {
        self.brush
    }

    pub fn painted(&self) -> &Canvas {
        &self.painted
    }

    pub fn into_painted(self) -> Canvas {
        self.painted
    }
}

/// Run a raster configuration to completion and return what it painted.
///
/// Echoes carry no new state, so the simulation runs with an echo count of
/// zero. Returns `None` for macro payloads.
pub fn paint_preview(config: &SequencerConfig) -> Option<Canvas> {
    let Payload::Raster {
        canvas,
        ink_button,
        position_sync,
        ..
    } = &config.payload
    else {
        return None;
    };

    let mut config = config.clone();
    config.timing = Timing::new(0, config.timing.polling_ms);
    config.completion_signal = false;

    let mut remote = RemoteCanvas::new(
        canvas.width(),
        canvas.height(),
        *ink_button,
        position_sync.clear_button,
    )
    .ok()?;

    let mut seq = Sequencer::new(config);
    let limit = report_limit(&seq, canvas);
    for _ in 0..limit {
        if seq.is_done() {
            break;
        }
        remote.apply(&seq.next_report());
    }
    Some(remote.into_painted())
}

/// Upper bound on reports before `Done`; the simple walk needs four per pixel
fn report_limit(seq: &Sequencer, canvas: &Canvas) -> u64 {
    let marks = seq.marks();
    let pixels = u64::from(canvas.width() + 2) * u64::from(canvas.height() + 2);
    u64::from(marks.sync_total) + u64::from(marks.position_total) + 4 * pixels + 16
}

/// One line of a report dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpEntry {
    pub index: u64,
    /// Phase the sequencer is in after producing the report
    pub phase: Phase,
    pub report: InputReport,
}

/// The next `count` reports of `seq`, echoes included
pub fn dump_reports(seq: &mut Sequencer, count: u64) -> Vec<DumpEntry> {
    (0..count)
        .map(|index| {
            let report = seq.next_report();
            DumpEntry {
                index,
                phase: seq.phase(),
                report,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::PositionSync;
    use crate::traversal::TraversalMode;
    use pokken_report::Hat;

    const ART: &str = "
#..##..#
.#....#.
..####..
#......#
##.##.##
........
";

    fn raster(canvas: Canvas, mode: TraversalMode, echo: u32) -> SequencerConfig {
        SequencerConfig::new(
            Timing::new(echo, 8),
            Payload::Raster {
                canvas,
                mode,
                ink_button: Button::A,
                position_sync: PositionSync::default(),
            },
        )
    }

    #[test]
    fn test_zigzag_preview_matches_canvas() {
        let canvas = Canvas::from_ascii(ART).unwrap();
        let painted = paint_preview(&raster(canvas.clone(), TraversalMode::ZigZag, 2)).unwrap();
        assert_eq!(painted.to_ascii(), canvas.to_ascii());
    }

    #[test]
    fn test_simple_preview_matches_canvas() {
        let canvas = Canvas::from_ascii(ART).unwrap();
        let painted = paint_preview(&raster(canvas.clone(), TraversalMode::Simple, 2)).unwrap();
        assert_eq!(painted, canvas);
    }

    #[test]
    fn test_sync_presses_are_wiped_by_clear() {
        // Confirm presses during controller sync land on the origin; the
        // clear during position sync must remove them
        let canvas = Canvas::blank(4, 2).unwrap();
        let painted = paint_preview(&raster(canvas, TraversalMode::ZigZag, 0)).unwrap();
        assert_eq!(painted.ink_count(), 0);
    }

    #[test]
    fn test_macro_has_no_preview() {
        let config = SequencerConfig::new(
            Timing::default(),
            Payload::Macro {
                script: "A(1)".parse().unwrap(),
                loop_forever: true,
            },
        );
        assert!(paint_preview(&config).is_none());
    }

    #[test]
    fn test_remote_canvas_clamps_brush() {
        let mut remote = RemoteCanvas::new(2, 2, Button::A, Button::Minus).unwrap();
        let mut r = InputReport::neutral();
        r.set_hat(Hat::UpLeft);
        remote.apply(&r);
        assert_eq!(remote.brush(), Cursor::ORIGIN);

        r.set_hat(Hat::DownRight);
        for _ in 0..5 {
            remote.apply(&r);
        }
        assert_eq!(remote.brush(), Cursor { x: 1, y: 1 });

        let mut park = InputReport::neutral();
        park.set_left_stick(STICK_MIN, STICK_MIN);
        remote.apply(&park);
        assert_eq!(remote.brush(), Cursor::ORIGIN);
    }

    #[test]
    fn test_dump_includes_echoes() {
        let mut seq = Sequencer::new(raster(Canvas::blank(2, 2).unwrap(), TraversalMode::ZigZag, 2));
        let entries = dump_reports(&mut seq, 9);
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[8].index, 8);
        assert!(entries.iter().all(|e| e.phase == Phase::SyncController));
    }
}
