//! Timed controller macros: parsing, display and per-tick playback.
//!
//! A macro is an ordered list of commands, each holding one input for a
//! number of ticks. Playback loops: once the last command finishes the
//! report is forced neutral and the sequencer goes back to its one-tick gap
//! before starting over (or stops, if looping is disabled).
//!
//! # Syntax
//!
//! ```text
//! B(5),Down(5),A(5)          hold B, then d-pad down, then A, 5 ticks each
//! Pause(1),A                 explicit gap; bare names use the default duration
//! L+R(3)                     several buttons at once
//! ```

use pokken_report::{Button, Buttons, Hat, InputReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Duration used for tokens written without `(ticks)`
pub const DEFAULT_DURATION: u16 = 5;

/// What a command does to the report while it is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroAction {
    /// Hold the d-pad in one direction
    Direction(Hat),
    /// Hold one button
    Button(Button),
    /// Hold several buttons together
    Combo(Buttons),
    /// Center sticks and hat; the duration still counts down
    Pause,
}

impl MacroAction {
    /// Apply this action to a report under construction
    pub fn apply(&self, report: &mut InputReport) {
        match self {
            MacroAction::Direction(hat) => report.set_hat(*hat),
            MacroAction::Button(button) => report.press(*button),
            MacroAction::Combo(buttons) => report.press_all(*buttons),
            MacroAction::Pause => report.center_sticks(),
        }
    }
}

impl fmt::Display for MacroAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroAction::Direction(hat) => write!(f, "{hat}"),
            MacroAction::Button(button) => write!(f, "{button}"),
            MacroAction::Combo(buttons) => write!(f, "{buttons}"),
            MacroAction::Pause => f.write_str("Pause"),
        }
    }
}

/// One macro entry: an action held for `duration` ticks (at least one)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub action: MacroAction,
    pub duration: u16,
}

impl Command {
    pub const fn new(action: MacroAction, duration: u16) -> Self {
        Self { action, duration }
    }

    /// Ticks this command occupies during playback
    pub fn ticks(&self) -> u32 {
        u32::from(self.duration.max(1))
    }
}

/// Playback position inside a script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MacroCursor {
    pub index: usize,
    pub elapsed: u16,
}

impl MacroCursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of one playback tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroProgress {
    /// Current command still has ticks left
    Holding,
    /// Moved on to the next command
    Advanced,
    /// Ran past the last command; cursor is back at 0 and the report is neutral
    Wrapped,
}

/// A parsed macro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacroScript {
    pub commands: Vec<Command>,
}

impl MacroScript {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Ticks one full pass takes, excluding the gap tick between passes
    pub fn total_ticks(&self) -> u64 {
        self.commands.iter().map(|c| u64::from(c.ticks())).sum()
    }

    /// Play one tick.
    ///
    /// Applies the command under the cursor to `report`, counts the tick, and
    /// advances once the command's duration is used up. The tick after the
    /// last command resets the cursor and forces `report` fully neutral.
    pub fn step(&self, cursor: &mut MacroCursor, report: &mut InputReport) -> MacroProgress {
        let Some(command) = self.commands.get(cursor.index) else {
            cursor.reset();
            *report = InputReport::neutral();
            return MacroProgress::Wrapped;
        };

        command.action.apply(report);
        cursor.elapsed = cursor.elapsed.saturating_add(1);

        if u32::from(cursor.elapsed) < command.ticks() {
            return MacroProgress::Holding;
        }

        cursor.index += 1;
        cursor.elapsed = 0;
        MacroProgress::Advanced
    }
}

/// Error type for parsing a macro script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMacroSeqError {
    EmptySequence,
    UnknownName(String),
    InvalidDuration(String),
}

impl fmt::Display for ParseMacroSeqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence => write!(f, "empty macro sequence"),
            Self::UnknownName(s) => {
                write!(f, "unknown input: \"{s}\" (expected a direction, button or Pause)")
            }
            Self::InvalidDuration(s) => write!(f, "invalid duration: \"{s}\""),
        }
    }
}

impl std::error::Error for ParseMacroSeqError {}

/// Split `Name(12)` into (`Name`, Some(12)). Plain names give `None`.
fn split_duration(token: &str) -> Result<(&str, Option<u16>), ParseMacroSeqError> {
    let Some(open) = token.find('(') else {
        return Ok((token, None));
    };
    let inner = token[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| ParseMacroSeqError::InvalidDuration(token.to_string()))?;
    let ticks = inner
        .trim()
        .parse::<u16>()
        .map_err(|_| ParseMacroSeqError::InvalidDuration(inner.trim().to_string()))?;
    Ok((token[..open].trim(), Some(ticks)))
}

/// Resolve an input name to an action
fn parse_action(name: &str) -> Result<MacroAction, ParseMacroSeqError> {
    match name.to_ascii_lowercase().as_str() {
        "pause" | "nothing" | "wait" | "-" => return Ok(MacroAction::Pause),
        _ => {}
    }

    if name.contains('+') {
        let buttons = name
            .split('+')
            .map(|part| {
                part.parse::<Button>()
                    .map_err(|_| ParseMacroSeqError::UnknownName(part.trim().to_string()))
            })
            .collect::<Result<Buttons, _>>()?;
        return Ok(MacroAction::Combo(buttons));
    }

    if let Ok(hat) = name.parse::<Hat>() {
        return Ok(MacroAction::Direction(hat));
    }
    name.parse::<Button>()
        .map(MacroAction::Button)
        .map_err(|_| ParseMacroSeqError::UnknownName(name.to_string()))
}

impl FromStr for MacroScript {
    type Err = ParseMacroSeqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMacroSeqError::EmptySequence);
        }

        let mut commands = Vec::new();
        for token in s.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (name, duration) = split_duration(token)?;
            let action = parse_action(name)?;
            commands.push(Command::new(action, duration.unwrap_or(DEFAULT_DURATION)));
        }

        if commands.is_empty() {
            return Err(ParseMacroSeqError::EmptySequence);
        }
        Ok(Self { commands })
    }
}

impl fmt::Display for MacroScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}({})", command.action, command.duration)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for MacroScript {
    type Error = ParseMacroSeqError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacroScript> for String {
    fn from(script: MacroScript) -> Self {
        script.to_string()
    }
}
