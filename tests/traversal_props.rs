//! Property-based tests for echo scheduling and raster traversal.

use pokken_driver::canvas::Canvas;
use pokken_driver::preview::paint_preview;
use pokken_driver::sequencer::{Payload, PositionSync, Sequencer, SequencerConfig};
use pokken_driver::timing::Timing;
use pokken_driver::traversal::{window_len, zigzag_direction, TraversalMode};
use pokken_driver::{Command, MacroAction, MacroScript};
use pokken_report::{Button, Hat};
use proptest::prelude::*;

/// Canvases with even dimensions (valid for both walks)
fn canvas_strategy() -> impl Strategy<Value = Canvas> {
    (1u32..=8, 1u32..=4).prop_flat_map(|(half_w, half_h)| {
        let (w, h) = (half_w * 2, half_h * 2);
        prop::collection::vec(any::<bool>(), (w * h) as usize).prop_map(move |bits| {
            Canvas::from_fn(w, h, |x, y| bits[(y * w + x) as usize]).unwrap()
        })
    })
}

fn mode_strategy() -> impl Strategy<Value = TraversalMode> {
    prop_oneof![Just(TraversalMode::ZigZag), Just(TraversalMode::Simple)]
}

fn action_strategy() -> impl Strategy<Value = MacroAction> {
    prop_oneof![
        Just(MacroAction::Pause),
        prop::sample::select(Hat::ALL.to_vec()).prop_map(MacroAction::Direction),
        prop::sample::select(Button::ALL.to_vec()).prop_map(MacroAction::Button),
    ]
}

fn script_strategy() -> impl Strategy<Value = MacroScript> {
    prop::collection::vec((action_strategy(), 1u16..6), 1..8).prop_map(|cmds| {
        MacroScript::new(
            cmds.into_iter()
                .map(|(action, duration)| Command::new(action, duration))
                .collect(),
        )
    })
}

fn raster(canvas: Canvas, mode: TraversalMode, echo: u32) -> SequencerConfig {
    SequencerConfig::new(
        Timing::new(echo, 8),
        Payload::Raster {
            canvas,
            mode,
            ink_button: Button::A,
            position_sync: PositionSync {
                duration_ms: 400,
                ..Default::default()
            },
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every computed report occupies exactly E + 1 consecutive polls.
    #[test]
    fn prop_echo_blocks(echo in 0u32..5, script in script_strategy(), polls in 1usize..600) {
        let mut seq = Sequencer::new(SequencerConfig::new(
            Timing::new(echo, 8),
            Payload::Macro { script, loop_forever: true },
        ));
        let reports: Vec<_> = (0..polls).map(|_| seq.next_report()).collect();

        let block = echo as usize + 1;
        for chunk in reports.chunks(block) {
            prop_assert!(chunk.iter().all(|r| *r == chunk[0]));
        }
        prop_assert_eq!(seq.state().computed as usize, polls.div_ceil(block));
    }

    /// Ink is only ever pressed with the cursor inside the canvas on a set pixel.
    #[test]
    fn prop_ink_in_bounds(canvas in canvas_strategy(), mode in mode_strategy()) {
        let mut seq = Sequencer::new(raster(canvas.clone(), mode, 0));
        while !seq.phase().is_traversal() {
            seq.next_report();
        }

        let mut steps = 0;
        while !seq.is_done() {
            let at = seq.state().cursor;
            let r = seq.next_report();
            if r.is_pressed(Button::A) {
                prop_assert_eq!(canvas.get(at.x, at.y), Some(true), "ink at {:?}", at);
            }
            steps += 1;
            prop_assert!(steps < 10_000);
        }
    }

    /// A clamping console reproduces the canvas exactly.
    #[test]
    fn prop_preview_reproduces_canvas(canvas in canvas_strategy(), mode in mode_strategy()) {
        let painted = paint_preview(&raster(canvas.clone(), mode, 2)).unwrap();
        prop_assert_eq!(painted, canvas);
    }

    /// No two consecutive ticks of a zig-zag window send the same direction.
    #[test]
    fn prop_zigzag_never_repeats(half_w in 1u32..=200, y in 0i32..240) {
        let n = window_len(half_w * 2);
        for t in 1..n {
            prop_assert_ne!(zigzag_direction(t - 1, n, y), zigzag_direction(t, n, y));
        }
    }
}
