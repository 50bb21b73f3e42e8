//! Transport error types

use thiserror::Error;

/// Errors that can occur while exchanging reports with the host
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Gadget device not found: {0}")]
    DeviceNotFound(String),

    #[error("Permission denied opening {0}")]
    PermissionDenied(String),

    #[error("Host disconnected")]
    Disconnected,

    #[error("Short write: sent {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransportError {
    /// Classify an error from opening a device node
    pub fn from_open(path: &str, e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => TransportError::DeviceNotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                TransportError::PermissionDenied(path.to_string())
            }
            _ => TransportError::Io(e),
        }
    }

    /// Classify an error from writing to an open device node.
    ///
    /// `f_hid` reports `ESHUTDOWN` once the host has dropped the configuration.
    pub fn from_write(e: std::io::Error) -> Self {
        match e.raw_os_error() {
            Some(ESHUTDOWN) => TransportError::Disconnected,
            _ => match e.kind() {
                std::io::ErrorKind::BrokenPipe => TransportError::Disconnected,
                _ => TransportError::Io(e),
            },
        }
    }
}

const ESHUTDOWN: i32 = 108;
