//! Driver configuration file
//!
//! TOML, stored at `~/.config/pokken/driver.toml` by default. Everything has
//! a default, so an absent file yields a working macro configuration.
//!
//! ```toml
//! device = "/dev/hidg0"
//! echo_count = 2
//!
//! [payload]
//! type = "raster"
//! image = "art.png"
//! mode = "zigzag"
//! ```

use anyhow::Context;
use pokken_report::{Button, Buttons, Hat, DEFAULT_GADGET_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::canvas::{Canvas, CanvasError, DEFAULT_THRESHOLD};
use crate::macro_seq::{Command, MacroAction, MacroScript};
use crate::sequencer::{ControllerSync, Payload, PositionSync, SequencerConfig};
use crate::timing::Timing;
use crate::traversal::TraversalMode;

/// Configuration problems found before anything is sent
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Polling interval must be at least 1 ms")]
    ZeroPolling,

    #[error("Macro payload has no commands")]
    EmptyMacro,

    #[error("Raster payload needs exactly one of `image`, `ascii` or `packed` (found {found})")]
    CanvasSource { found: usize },

    #[error("Packed canvas {path:?} needs `width` and `height`")]
    PackedDimensions { path: PathBuf },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("Zig-zag traversal needs an even width and height of at least 2, got {width}x{height}")]
    ZigZagLayout { width: u32, height: u32 },

    #[error("Simple traversal needs a width of at least 2, got {width}")]
    SimpleWidth { width: u32 },

    #[error("Canvas is {actual_width}x{actual_height} but {width}x{height} was configured")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

fn default_device() -> PathBuf {
    PathBuf::from(DEFAULT_GADGET_PATH)
}

fn default_polling_ms() -> u32 {
    8
}

fn default_echo_count() -> u32 {
    2
}

fn default_blink_ms() -> u32 {
    250
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_ink_button() -> Button {
    Button::A
}

fn default_sync_position_ms() -> u32 {
    PositionSync::default().duration_ms
}

fn default_clear_button() -> Button {
    PositionSync::default().clear_button
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// HID gadget node
    #[serde(default = "default_device")]
    pub device: PathBuf,

    /// Host polling interval in milliseconds
    #[serde(default = "default_polling_ms")]
    pub polling_ms: u32,

    /// Extra polls each report is held for
    #[serde(default = "default_echo_count")]
    pub echo_count: u32,

    /// Blink an indicator once the sequence is done
    #[serde(default)]
    pub completion_signal: bool,

    #[serde(default = "default_blink_ms")]
    pub blink_ms: u32,

    /// sysfs LED brightness file for the completion signal (logs otherwise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_path: Option<PathBuf>,

    /// Override of the controller sync presses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncConfig>,

    #[serde(default)]
    pub payload: PayloadConfig,
}

/// Controller sync overrides; unset fields keep the payload's defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_buttons: Option<Buttons>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_buttons: Option<Buttons>,
}

/// What to play after sync
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PayloadConfig {
    Macro(MacroConfig),
    Raster(RasterConfig),
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self::Macro(MacroConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroConfig {
    pub script: MacroScript,
    #[serde(default = "default_true")]
    pub loop_forever: bool,
}

impl Default for MacroConfig {
    fn default() -> Self {
        // Menu navigation demo: B, down twice, A twice, with gaps between
        let gap = Command::new(MacroAction::Pause, 1);
        let hold = |action| Command::new(action, 5);
        Self {
            script: MacroScript::new(vec![
                gap,
                hold(MacroAction::Button(Button::B)),
                gap,
                hold(MacroAction::Direction(Hat::Down)),
                gap,
                hold(MacroAction::Direction(Hat::Down)),
                gap,
                hold(MacroAction::Button(Button::A)),
                gap,
                hold(MacroAction::Button(Button::A)),
            ]),
            loop_forever: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Image file, thresholded to ink/background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,

    /// Inline ASCII art (`#` is ink)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascii: Option<String>,

    /// Packed bitmap file (LSB-first rows padded to bytes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packed: Option<PathBuf>,

    #[serde(default = "default_threshold")]
    pub threshold: u8,

    #[serde(default)]
    pub invert: bool,

    #[serde(default)]
    pub mode: TraversalMode,

    #[serde(default = "default_ink_button")]
    pub ink_button: Button,

    #[serde(default = "default_sync_position_ms")]
    pub sync_position_ms: u32,

    #[serde(default = "default_clear_button")]
    pub clear_button: Button,

    /// Expected canvas size; required for `packed`, checked otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            image: None,
            ascii: None,
            packed: None,
            threshold: default_threshold(),
            invert: false,
            mode: TraversalMode::default(),
            ink_button: default_ink_button(),
            sync_position_ms: default_sync_position_ms(),
            clear_button: default_clear_button(),
            width: None,
            height: None,
        }
    }
}

impl RasterConfig {
    /// Load the canvas from whichever source is configured
    pub fn load_canvas(&self) -> Result<Canvas, ConfigError> {
        let found = [self.image.is_some(), self.ascii.is_some(), self.packed.is_some()]
            .iter()
            .filter(|s| **s)
            .count();
        if found != 1 {
            return Err(ConfigError::CanvasSource { found });
        }

        let canvas = if let Some(path) = &self.image {
            Canvas::load_image(path, self.threshold, self.invert)?
        } else if let Some(art) = &self.ascii {
            Canvas::from_ascii(art)?
        } else if let Some(path) = &self.packed {
            let (Some(width), Some(height)) = (self.width, self.height) else {
                return Err(ConfigError::PackedDimensions { path: path.clone() });
            };
            let data = std::fs::read(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            Canvas::from_packed(width, height, &data)?
        } else {
            return Err(ConfigError::CanvasSource { found: 0 });
        };

        self.check_layout(&canvas)?;
        Ok(canvas)
    }

    fn check_layout(&self, canvas: &Canvas) -> Result<(), ConfigError> {
        let (actual_width, actual_height) = (canvas.width(), canvas.height());
        let width = self.width.unwrap_or(actual_width);
        let height = self.height.unwrap_or(actual_height);
        if (width, height) != (actual_width, actual_height) {
            return Err(ConfigError::DimensionMismatch {
                width,
                height,
                actual_width,
                actual_height,
            });
        }

        match self.mode {
            // The console clamps its brush at the edges, so a sweep that
            // spills past the last row would desync the cursor
            TraversalMode::ZigZag
                if actual_width < 2
                    || actual_width % 2 != 0
                    || actual_height < 2
                    || actual_height % 2 != 0 =>
            {
                Err(ConfigError::ZigZagLayout {
                    width: actual_width,
                    height: actual_height,
                })
            }
            TraversalMode::Simple if actual_width < 2 => Err(ConfigError::SimpleWidth {
                width: actual_width,
            }),
            _ => Ok(()),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            polling_ms: default_polling_ms(),
            echo_count: default_echo_count(),
            completion_signal: false,
            blink_ms: default_blink_ms(),
            led_path: None,
            sync: None,
            payload: PayloadConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pokken")
            .join("driver.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: DriverConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing::new(self.echo_count, self.polling_ms)
    }

    /// Check the configuration, loading the canvas if there is one
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_sequencer().map(|_| ())
    }

    /// Resolve payload sources and defaults into a sequencer configuration
    pub fn build_sequencer(&self) -> Result<SequencerConfig, ConfigError> {
        if self.polling_ms == 0 {
            return Err(ConfigError::ZeroPolling);
        }

        let payload = match &self.payload {
            PayloadConfig::Macro(m) => {
                if m.script.is_empty() {
                    return Err(ConfigError::EmptyMacro);
                }
                Payload::Macro {
                    script: m.script.clone(),
                    loop_forever: m.loop_forever,
                }
            }
            PayloadConfig::Raster(r) => Payload::Raster {
                canvas: r.load_canvas()?,
                mode: r.mode,
                ink_button: r.ink_button,
                position_sync: PositionSync {
                    duration_ms: r.sync_position_ms,
                    clear_button: r.clear_button,
                },
            },
        };

        let mut config = SequencerConfig::new(self.timing(), payload);
        if let Some(sync) = &self.sync {
            apply_sync(&mut config.controller_sync, sync);
        }
        config.completion_signal = self.completion_signal;
        config.blink_ms = self.blink_ms;
        Ok(config)
    }
}

fn apply_sync(target: &mut ControllerSync, sync: &SyncConfig) {
    if let Some(ms) = sync.duration_ms {
        target.duration_ms = ms;
    }
    if let Some(buttons) = sync.pair_buttons {
        target.pair_buttons = buttons;
    }
    if let Some(buttons) = sync.confirm_buttons {
        target.confirm_buttons = buttons;
    }
}
