//! Device-side transport abstraction
//!
//! A transport is the thing that actually moves report bytes to the host:
//! the Linux USB gadget HID function, an in-memory recorder for tests, or a
//! sink that drops everything for dry runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::TransportError;
use crate::report::{InputReport, OutputReport};

/// The core transport trait - all backends implement this
#[async_trait]
pub trait ReportTransport: Send + Sync {
    /// Deliver one controller report to the host.
    ///
    /// Backends that are paced by the host (the gadget function) may wait
    /// here until the previous report has been collected.
    async fn send_input(&self, report: &InputReport) -> Result<(), TransportError>;

    /// Take one pending host-to-device report, if any arrived.
    ///
    /// Never waits. Callers read and drop these; the content carries no
    /// meaning for the emulated controller.
    async fn poll_output(&self) -> Result<Option<OutputReport>, TransportError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Type alias for a shared transport
pub type BoxedTransport = Arc<dyn ReportTransport>;

/// Records every report it is given; host packets can be injected.
#[derive(Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<InputReport>>,
    pending_output: Mutex<VecDeque<OutputReport>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a host packet to be returned by the next `poll_output`
    pub fn inject_output(&self, report: OutputReport) {
        self.pending_output.lock().push_back(report);
    }

    /// Copy of every report sent so far
    pub fn sent(&self) -> Vec<InputReport> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Number of injected host packets not yet drained
    pub fn pending_output(&self) -> usize {
        self.pending_output.lock().len()
    }
}

#[async_trait]
impl ReportTransport for MemoryTransport {
    async fn send_input(&self, report: &InputReport) -> Result<(), TransportError> {
        self.sent.lock().push(*report);
        Ok(())
    }

    async fn poll_output(&self) -> Result<Option<OutputReport>, TransportError> {
        Ok(self.pending_output.lock().pop_front())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Accepts and drops every report
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardTransport;

#[async_trait]
impl ReportTransport for DiscardTransport {
    async fn send_input(&self, _report: &InputReport) -> Result<(), TransportError> {
        Ok(())
    }

    async fn poll_output(&self) -> Result<Option<OutputReport>, TransportError> {
        Ok(None)
    }

    fn describe(&self) -> String {
        "discard".to_string()
    }
}
