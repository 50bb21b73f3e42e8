//! Symbolic controller inputs: hat directions and button flags
//!
//! Names follow the Switch Pro Controller labels. Both enums parse
//! case-insensitively from their names so macro scripts and config files
//! can refer to them as plain strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// D-pad (hat switch) state: eight compass points plus released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hat {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Center,
}

impl Hat {
    /// All hat states in wire order (0..=8)
    pub const ALL: [Hat; 9] = [
        Hat::Up,
        Hat::UpRight,
        Hat::Right,
        Hat::DownRight,
        Hat::Down,
        Hat::DownLeft,
        Hat::Left,
        Hat::UpLeft,
        Hat::Center,
    ];

    /// Wire value of this direction
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Decode a wire value. Anything above 8 is not a valid hat state.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Horizontal component: -1 for any leftward direction, +1 for rightward
    pub const fn dx(self) -> i32 {
        match self {
            Hat::UpRight | Hat::Right | Hat::DownRight => 1,
            Hat::DownLeft | Hat::Left | Hat::UpLeft => -1,
            Hat::Up | Hat::Down | Hat::Center => 0,
        }
    }

    /// Vertical component in screen coordinates: +1 for any downward direction
    pub const fn dy(self) -> i32 {
        match self {
            Hat::DownRight | Hat::Down | Hat::DownLeft => 1,
            Hat::UpLeft | Hat::Up | Hat::UpRight => -1,
            Hat::Left | Hat::Right | Hat::Center => 0,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Hat::Up => "Up",
            Hat::UpRight => "UpRight",
            Hat::Right => "Right",
            Hat::DownRight => "DownRight",
            Hat::Down => "Down",
            Hat::DownLeft => "DownLeft",
            Hat::Left => "Left",
            Hat::UpLeft => "UpLeft",
            Hat::Center => "Center",
        }
    }
}

impl fmt::Display for Hat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised button or direction name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} name: \"{name}\"")]
pub struct UnknownNameError {
    pub kind: &'static str,
    pub name: String,
}

impl FromStr for Hat {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|h| h.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNameError {
                kind: "direction",
                name: s.to_string(),
            })
    }
}

/// A single controller button.
///
/// Discriminants are bit positions in the report's button word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Y = 0,
    B = 1,
    A = 2,
    X = 3,
    L = 4,
    R = 5,
    ZL = 6,
    ZR = 7,
    Minus = 8,
    Plus = 9,
    LClick = 10,
    RClick = 11,
    Home = 12,
    Capture = 13,
}

impl Button {
    pub const ALL: [Button; 14] = [
        Button::Y,
        Button::B,
        Button::A,
        Button::X,
        Button::L,
        Button::R,
        Button::ZL,
        Button::ZR,
        Button::Minus,
        Button::Plus,
        Button::LClick,
        Button::RClick,
        Button::Home,
        Button::Capture,
    ];

    /// Bit mask of this button in the report's button word
    pub const fn mask(self) -> u16 {
        1 << (self as u16)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::Y => "Y",
            Button::B => "B",
            Button::A => "A",
            Button::X => "X",
            Button::L => "L",
            Button::R => "R",
            Button::ZL => "ZL",
            Button::ZR => "ZR",
            Button::Minus => "Minus",
            Button::Plus => "Plus",
            Button::LClick => "LClick",
            Button::RClick => "RClick",
            Button::Home => "Home",
            Button::Capture => "Capture",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNameError {
                kind: "button",
                name: s.to_string(),
            })
    }
}

/// Set of simultaneously held buttons.
///
/// Serializes as a list of button names, e.g. `["L", "R"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Button>", into = "Vec<Button>")]
pub struct Buttons(u16);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.mask();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.mask();
    }

    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.mask() != 0
    }

    /// Buttons in this set, in bit order
    pub fn iter(self) -> impl Iterator<Item = Button> {
        Button::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

impl From<Button> for Buttons {
    fn from(button: Button) -> Self {
        Self(button.mask())
    }
}

impl FromIterator<Button> for Buttons {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        let mut set = Buttons::NONE;
        for b in iter {
            set.insert(b);
        }
        set
    }
}

impl From<Vec<Button>> for Buttons {
    fn from(list: Vec<Button>) -> Self {
        list.into_iter().collect()
    }
}

impl From<Buttons> for Vec<Button> {
    fn from(set: Buttons) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let names: Vec<&str> = self.iter().map(Button::name).collect();
        f.write_str(&names.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hat_wire_values() {
        assert_eq!(Hat::Up.to_u8(), 0);
        assert_eq!(Hat::Right.to_u8(), 2);
        assert_eq!(Hat::Down.to_u8(), 4);
        assert_eq!(Hat::Left.to_u8(), 6);
        assert_eq!(Hat::Center.to_u8(), 8);
        assert_eq!(Hat::from_u8(7), Some(Hat::UpLeft));
        assert_eq!(Hat::from_u8(9), None);
    }

    #[test]
    fn test_hat_components() {
        assert_eq!((Hat::DownRight.dx(), Hat::DownRight.dy()), (1, 1));
        assert_eq!((Hat::UpLeft.dx(), Hat::UpLeft.dy()), (-1, -1));
        assert_eq!((Hat::Center.dx(), Hat::Center.dy()), (0, 0));
        assert_eq!((Hat::Left.dx(), Hat::Left.dy()), (-1, 0));
    }

    #[test]
    fn test_button_masks_match_pokken_layout() {
        assert_eq!(Button::Y.mask(), 0x0001);
        assert_eq!(Button::A.mask(), 0x0004);
        assert_eq!(Button::L.mask(), 0x0010);
        assert_eq!(Button::Minus.mask(), 0x0100);
        assert_eq!(Button::Home.mask(), 0x1000);
        assert_eq!(Button::Capture.mask(), 0x2000);
    }

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!("downleft".parse::<Hat>().unwrap(), Hat::DownLeft);
        assert_eq!(" minus ".parse::<Button>().unwrap(), Button::Minus);
        let err = "Turbo".parse::<Button>().unwrap_err();
        assert_eq!(err.to_string(), "unknown button name: \"Turbo\"");
    }

    #[test]
    fn test_buttons_set() {
        let set: Buttons = [Button::L, Button::R].into_iter().collect();
        assert!(set.contains(Button::L));
        assert!(!set.contains(Button::A));
        assert_eq!(set.bits(), 0x0030);
        assert_eq!(set.to_string(), "L+R");
        assert_eq!(Buttons::NONE.to_string(), "-");
    }

    #[test]
    fn test_buttons_serialize_as_names() {
        let set: Buttons = [Button::A, Button::Home].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["A","Home"]"#);
        let back: Buttons = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
