//! Completion indicator
//!
//! Receives the blink level the sequencer raises while it sits in `Done`.

use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Something that can show the completion blink
pub trait CompletionIndicator: Send {
    fn set(&mut self, on: bool) -> io::Result<()>;
}

/// Logs level changes; the default when no LED is configured
#[derive(Debug, Default)]
pub struct LogIndicator {
    level: Option<bool>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Option<bool> {
        self.level
    }
}

impl CompletionIndicator for LogIndicator {
    fn set(&mut self, on: bool) -> io::Result<()> {
        if self.level != Some(on) {
            info!("Completion indicator {}", if on { "on" } else { "off" });
            self.level = Some(on);
        }
        Ok(())
    }
}

/// Linux LED class device, e.g. `/sys/class/leds/led0/brightness`
#[derive(Debug)]
pub struct LedIndicator {
    path: PathBuf,
}

impl LedIndicator {
    /// Check the brightness file is writable and switch the LED off
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut led = Self {
            path: path.as_ref().to_path_buf(),
        };
        led.set(false)?;
        Ok(led)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompletionIndicator for LedIndicator {
    fn set(&mut self, on: bool) -> io::Result<()> {
        std::fs::write(&self.path, if on { "1" } else { "0" })
    }
}
