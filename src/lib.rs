// Pokken controller driver - shared library
// Report sequencing (sync, macro playback, raster drawing) and the polling loop

pub mod canvas;
pub mod config;
pub mod driver;
pub mod echo;
pub mod indicator;
pub mod macro_seq;
pub mod preview;
pub mod sequencer;
pub mod timing;
pub mod traversal;

pub use canvas::{Canvas, CanvasError};
pub use config::{ConfigError, DriverConfig};
pub use driver::{DriverStats, Pacing, PollingDriver};
pub use echo::EchoScheduler;
pub use macro_seq::{Command, MacroAction, MacroScript, ParseMacroSeqError};
pub use sequencer::{Payload, Phase, Sequencer, SequencerConfig};
pub use timing::Timing;
pub use traversal::{Cursor, TraversalMode};
