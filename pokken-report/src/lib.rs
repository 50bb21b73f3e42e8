//! Report model and transports for an emulated Pokken/Switch controller
//!
//! This crate knows nothing about *what* the controller does; it only
//! defines the 8-byte report frames and the backends that move them:
//!
//! - HID gadget (`/dev/hidgN`, Linux USB device mode)
//! - Memory (records reports, used by tests and previews)
//! - Discard (dry runs)
//! - Printer middleware (prints every frame passing through another backend)

pub mod error;
pub mod hidg;
pub mod printer;
pub mod report;
pub mod transport;
pub mod types;

pub use error::TransportError;
pub use hidg::{HidGadgetTransport, DEFAULT_GADGET_PATH};
pub use printer::{describe_report, hex_report, PrinterConfig, PrinterTransport, ReportFilter};
pub use report::{InputReport, OutputReport, REPORT_SIZE, STICK_CENTER, STICK_MAX, STICK_MIN};
pub use transport::{BoxedTransport, DiscardTransport, MemoryTransport, ReportTransport};
pub use types::{Button, Buttons, Hat, UnknownNameError};
