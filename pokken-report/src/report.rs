//! Fixed-layout HID reports exchanged with the host
//!
//! The layout is the one HORI's Pokken Tournament Pro Pad uses, which the
//! Switch accepts as a Pro Controller:
//!
//! ```text
//! byte  0-1   button bitmask (little endian)
//! byte  2     hat switch (0-7 compass points, 8 = released)
//! byte  3-6   LX, LY, RX, RY (0..=255, 128 = centered)
//! byte  7     vendor specific, always 0
//! ```

use crate::types::{Button, Buttons, Hat};
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of both report directions on the wire
pub const REPORT_SIZE: usize = 8;

/// Stick axis extremes and rest position
pub const STICK_MIN: u8 = 0;
pub const STICK_CENTER: u8 = 128;
pub const STICK_MAX: u8 = 255;

/// Controller state sent from the emulated device to the host.
///
/// Fields are private so the hat byte can only ever hold a valid [`Hat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct InputReport {
    buttons: U16,
    hat: u8,
    lx: u8,
    ly: u8,
    rx: u8,
    ry: u8,
    vendor: u8,
}

impl InputReport {
    /// Fully released report: sticks centered, hat released, no buttons
    pub const fn neutral() -> Self {
        Self {
            buttons: U16::ZERO,
            hat: Hat::Center.to_u8(),
            lx: STICK_CENTER,
            ly: STICK_CENTER,
            rx: STICK_CENTER,
            ry: STICK_CENTER,
            vendor: 0,
        }
    }

    /// Decode a report received as raw bytes.
    ///
    /// Returns `None` if the slice is not exactly [`REPORT_SIZE`] bytes or the
    /// hat byte is out of range.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let report = Self::read_from_bytes(bytes).ok()?;
        Hat::from_u8(report.hat)?;
        Some(report)
    }

    pub fn hat(&self) -> Hat {
        // Only constructors in this module write the hat byte.
        Hat::from_u8(self.hat).unwrap_or_default()
    }

    pub fn set_hat(&mut self, hat: Hat) {
        self.hat = hat.to_u8();
    }

    pub fn buttons(&self) -> Buttons {
        Buttons::from_bits(self.buttons.get())
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons().contains(button)
    }

    pub fn press(&mut self, button: Button) {
        self.press_all(button.into());
    }

    pub fn press_all(&mut self, buttons: Buttons) {
        self.buttons = U16::new(self.buttons.get() | buttons.bits());
    }

    pub fn release(&mut self, button: Button) {
        self.buttons = U16::new(self.buttons.get() & !button.mask());
    }

    pub fn left_stick(&self) -> (u8, u8) {
        (self.lx, self.ly)
    }

    pub fn right_stick(&self) -> (u8, u8) {
        (self.rx, self.ry)
    }

    pub fn set_left_stick(&mut self, x: u8, y: u8) {
        self.lx = x;
        self.ly = y;
    }

    pub fn set_right_stick(&mut self, x: u8, y: u8) {
        self.rx = x;
        self.ry = y;
    }

    /// Return all four axes and the hat to rest, leaving buttons alone
    pub fn center_sticks(&mut self) {
        self.set_left_stick(STICK_CENTER, STICK_CENTER);
        self.set_right_stick(STICK_CENTER, STICK_CENTER);
        self.set_hat(Hat::Center);
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }

    /// Raw wire bytes
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut out = [0u8; REPORT_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

impl Default for InputReport {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Report sent by the host to the device.
///
/// The Switch never sends anything meaningful here; it is read only so the
/// endpoint does not stall, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct OutputReport {
    pub data: [u8; REPORT_SIZE],
}

impl OutputReport {
    /// Copy up to [`REPORT_SIZE`] bytes from a raw packet, zero padding the rest
    pub fn from_packet(packet: &[u8]) -> Self {
        let mut data = [0u8; REPORT_SIZE];
        let len = packet.len().min(REPORT_SIZE);
        data[..len].copy_from_slice(&packet[..len]);
        Self { data }
    }
}
