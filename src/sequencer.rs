//! Report sequencing state machine
//!
//! One call to [`Sequencer::next_report`] per poll. The sequencer first
//! syncs the controller with the console (timed button presses), then
//! either replays a macro or walks a canvas, then idles in `Done`.
//!
//! ```text
//! macro:   SyncController -> Breathe -> Macro -> Breathe -> Macro ... (or Done)
//! raster:  SyncController -> SyncPosition -> ZigZag ............... -> Done
//!                                         -> StopX <-> MoveX / StopY <-> MoveY -> Done
//! ```
//!
//! All waiting is tick counting; nothing here sleeps or blocks.

use pokken_report::{Button, Buttons, Hat, InputReport, STICK_MIN};
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::echo::EchoScheduler;
use crate::macro_seq::{MacroCursor, MacroProgress, MacroScript};
use crate::timing::Timing;
use crate::traversal::{self, Cursor, TraversalMode};

/// Sequencer phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Timed presses that make the console accept the controller
    SyncController,
    /// One released tick between sync (or a finished pass) and macro playback
    Breathe,
    /// Macro playback
    Macro,
    /// Sticks pinned to the top-left corner while the canvas is cleared
    SyncPosition,
    /// Two-row zig-zag sweep
    ZigZag,
    /// Simple walk: released tick before a horizontal move
    StopX,
    /// Simple walk: one horizontal step
    MoveX,
    /// Simple walk: released tick at the end of a row
    StopY,
    /// Simple walk: one step down to the next row
    MoveY,
    /// Finished; neutral reports forever
    Done,
}

impl Phase {
    /// Phases in which the cursor moves and ink is decided
    pub fn is_traversal(self) -> bool {
        matches!(
            self,
            Phase::ZigZag | Phase::StopX | Phase::MoveX | Phase::StopY | Phase::MoveY
        )
    }
}

/// Controller sync timing and the buttons pressed at its four marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSync {
    pub duration_ms: u32,
    /// Pressed at the first and second quarter marks
    pub pair_buttons: Buttons,
    /// Pressed at the third quarter mark and at the end
    pub confirm_buttons: Buttons,
}

impl ControllerSync {
    /// L, then A, over two seconds
    pub fn for_macro() -> Self {
        Self {
            duration_ms: 2000,
            pair_buttons: Button::L.into(),
            confirm_buttons: Button::A.into(),
        }
    }

    /// L+R, then A; the drawing screen takes both shoulders
    pub fn for_raster() -> Self {
        Self {
            duration_ms: 1600,
            pair_buttons: [Button::L, Button::R].into_iter().collect(),
            confirm_buttons: Button::A.into(),
        }
    }
}

/// Cursor reset before drawing: pin the stick to the corner, clear twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSync {
    pub duration_ms: u32,
    pub clear_button: Button,
}

impl Default for PositionSync {
    fn default() -> Self {
        Self {
            duration_ms: 4000,
            clear_button: Button::Minus,
        }
    }
}

/// What gets played after sync
#[derive(Debug, Clone)]
pub enum Payload {
    Macro {
        script: MacroScript,
        /// Replay forever (true) or stop in `Done` after one pass
        loop_forever: bool,
    },
    Raster {
        canvas: Canvas,
        mode: TraversalMode,
        ink_button: Button,
        position_sync: PositionSync,
    },
}

/// Static sequencer configuration
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub timing: Timing,
    pub controller_sync: ControllerSync,
    pub payload: Payload,
    /// Blink a completion toggle while in `Done`
    pub completion_signal: bool,
    /// Half period of the completion blink
    pub blink_ms: u32,
}

impl SequencerConfig {
    pub fn new(timing: Timing, payload: Payload) -> Self {
        let controller_sync = match payload {
            Payload::Macro { .. } => ControllerSync::for_macro(),
            Payload::Raster { .. } => ControllerSync::for_raster(),
        };
        Self {
            timing,
            controller_sync,
            payload,
            completion_signal: false,
            blink_ms: 250,
        }
    }
}

/// Tick marks derived once from the millisecond configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickMarks {
    pub sync_total: u32,
    pub pair: [u32; 2],
    pub confirm: [u32; 2],
    pub position_total: u32,
    pub clear: [u32; 2],
    pub blink: u32,
}

impl TickMarks {
    pub fn new(config: &SequencerConfig) -> Self {
        let t = config.timing;
        let d = config.controller_sync.duration_ms;
        let p = match &config.payload {
            Payload::Raster { position_sync, .. } => position_sync.duration_ms,
            Payload::Macro { .. } => 0,
        };
        Self {
            sync_total: t.ms_to_ticks(d),
            pair: [t.ms_to_ticks(d / 4), t.ms_to_ticks(d / 2)],
            confirm: [t.ms_to_ticks(d / 4 * 3), t.ms_to_ticks(d)],
            position_total: t.ms_to_ticks(p),
            clear: [t.ms_to_ticks(p * 3 / 10), t.ms_to_ticks(p * 6 / 10)],
            blink: t.ms_to_ticks(config.blink_ms).max(1),
        }
    }
}

/// Everything the sequencer mutates between ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerState {
    pub phase: Phase,
    /// Tick counter for the timed sync phases
    pub tick: u32,
    pub cursor: Cursor,
    pub macro_cursor: MacroCursor,
    /// Position inside the current zig-zag window
    pub window_tick: u32,
    /// Logical ticks spent in `Done`
    pub done_ticks: u64,
    /// Completion indicator level
    pub completion: bool,
    /// Logical reports computed so far (echoes excluded)
    pub computed: u64,
}

impl Default for SequencerState {
    fn default() -> Self {
        Self {
            phase: Phase::SyncController,
            tick: 0,
            cursor: Cursor::ORIGIN,
            macro_cursor: MacroCursor::default(),
            window_tick: 0,
            done_ticks: 0,
            completion: false,
            computed: 0,
        }
    }
}

/// The report sequencing engine
#[derive(Debug, Clone)]
pub struct Sequencer {
    config: SequencerConfig,
    marks: TickMarks,
    state: SequencerState,
    echo: EchoScheduler,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Self {
        let marks = TickMarks::new(&config);
        let echo = EchoScheduler::new(config.timing.echo_count);
        debug!("Sequencer tick marks: {:?}", marks);
        Self {
            config,
            marks,
            state: SequencerState::default(),
            echo,
        }
    }

    /// Produce the report for this poll (echoing the previous one if due)
    pub fn next_report(&mut self) -> InputReport {
        let Self {
            config,
            marks,
            state,
            echo,
        } = self;
        echo.next_with(|| compute(state, config, marks))
    }

    /// Back to the initial phase with zeroed counters
    pub fn reset(&mut self) {
        self.state = SequencerState::default();
        self.echo.reset();
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn marks(&self) -> &TickMarks {
        &self.marks
    }

    pub fn echo(&self) -> &EchoScheduler {
        &self.echo
    }

    pub fn is_done(&self) -> bool {
        self.state.phase == Phase::Done
    }

    /// Completion indicator level, or `None` when the signal is disabled
    pub fn completion_signal(&self) -> Option<bool> {
        self.config
            .completion_signal
            .then_some(self.state.completion)
    }
}

fn enter(state: &mut SequencerState, next: Phase) {
    if state.phase != next {
        debug!(
            "Phase {:?} -> {:?} after {} reports",
            state.phase, next, state.computed
        );
        if next == Phase::Done {
            info!("Sequence finished after {} reports", state.computed);
        }
        state.phase = next;
    }
}

/// Compute one fresh report and advance the state machine
fn compute(state: &mut SequencerState, config: &SequencerConfig, marks: &TickMarks) -> InputReport {
    let mut report = InputReport::neutral();
    state.computed += 1;

    match state.phase {
        Phase::SyncController => sync_controller(state, config, marks, &mut report),
        Phase::Breathe => enter(state, Phase::Macro),
        Phase::Macro => {
            if let Payload::Macro {
                script,
                loop_forever,
            } = &config.payload
            {
                if script.step(&mut state.macro_cursor, &mut report) == MacroProgress::Wrapped {
                    let next = if *loop_forever {
                        Phase::Breathe
                    } else {
                        Phase::Done
                    };
                    enter(state, next);
                }
            }
        }
        Phase::SyncPosition => sync_position(state, config, marks, &mut report),
        Phase::ZigZag | Phase::StopX | Phase::MoveX | Phase::StopY | Phase::MoveY => {
            if let Payload::Raster {
                canvas, ink_button, ..
            } = &config.payload
            {
                traverse(state, canvas, *ink_button, &mut report);
            }
        }
        Phase::Done => {
            if config.completion_signal {
                if state.done_ticks % u64::from(marks.blink) == 0 {
                    state.completion = !state.completion;
                }
                state.done_ticks += 1;
            }
        }
    }

    report
}

fn sync_controller(
    state: &mut SequencerState,
    config: &SequencerConfig,
    marks: &TickMarks,
    report: &mut InputReport,
) {
    if state.tick > marks.sync_total {
        state.tick = 0;
        let next = match config.payload {
            Payload::Macro { .. } => Phase::Breathe,
            Payload::Raster { .. } => Phase::SyncPosition,
        };
        enter(state, next);
        return;
    }

    if marks.pair.contains(&state.tick) {
        report.press_all(config.controller_sync.pair_buttons);
    } else if marks.confirm.contains(&state.tick) {
        report.press_all(config.controller_sync.confirm_buttons);
    }
    state.tick += 1;
}

fn sync_position(
    state: &mut SequencerState,
    config: &SequencerConfig,
    marks: &TickMarks,
    report: &mut InputReport,
) {
    let Payload::Raster {
        mode,
        position_sync,
        ..
    } = &config.payload
    else {
        return;
    };

    if state.tick >= marks.position_total {
        state.tick = 0;
        state.cursor = Cursor::ORIGIN;
        state.window_tick = 0;
        let entry = match mode {
            TraversalMode::ZigZag => Phase::ZigZag,
            TraversalMode::Simple => Phase::StopX,
        };
        enter(state, entry);
        return;
    }

    // Full deflection toward the corner moves the remote cursor fastest
    report.set_left_stick(STICK_MIN, STICK_MIN);
    if marks.clear.contains(&state.tick) {
        report.press(position_sync.clear_button);
    }
    state.tick += 1;
}

fn traverse(state: &mut SequencerState, canvas: &Canvas, ink_button: Button, report: &mut InputReport) {
    let phase = state.phase;
    let hat = match phase {
        Phase::ZigZag => {
            let window = traversal::window_len(canvas.width());
            let hat = traversal::zigzag_direction(state.window_tick, window, state.cursor.y);
            state.window_tick = (state.window_tick + 1) % window;
            hat
        }
        Phase::MoveX => traversal::simple_row_direction(state.cursor.y),
        Phase::MoveY => Hat::Down,
        _ => Hat::Center,
    };

    report.set_hat(hat);
    if traversal::ink_at(canvas, state.cursor) {
        report.press(ink_button);
    }
    state.cursor.apply(hat);

    let last_col = canvas.width() as i32 - 1;
    let last_row = canvas.height() as i32 - 1;
    let next = match phase {
        Phase::StopX => Phase::MoveX,
        Phase::MoveX if state.cursor.x > 0 && state.cursor.x < last_col => Phase::StopX,
        Phase::MoveX => Phase::StopY,
        Phase::StopY if state.cursor.y < last_row => Phase::MoveY,
        Phase::StopY => Phase::Done,
        Phase::MoveY => Phase::StopX,
        other => other,
    };

    if state.cursor.y > last_row {
        enter(state, Phase::Done);
    } else {
        enter(state, next);
    }
}
