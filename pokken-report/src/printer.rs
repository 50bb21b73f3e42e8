//! PrinterTransport middleware for monitoring the report stream
//!
//! Wraps any [`ReportTransport`] and prints every controller report passing
//! through it, plus any packet the host sends back.
//!
//! # Example
//!
//! ```ignore
//! use pokken_report::{DiscardTransport, PrinterConfig, PrinterTransport};
//!
//! let monitored = PrinterTransport::wrap(Arc::new(DiscardTransport), PrinterConfig::default());
//! // Now every report will be printed instead of sent anywhere
//! ```

use async_trait::async_trait;
use crossterm::style::Stylize;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::TransportError;
use crate::report::{InputReport, OutputReport};
use crate::transport::ReportTransport;

/// Which reports get printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFilter {
    /// Every report, including echoes of the previous one
    #[default]
    All,
    /// Only reports that differ from the one before
    Changes,
    /// Only reports with something pressed or deflected
    Active,
}

impl FromStr for ReportFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "changes" | "changed" | "diff" => Ok(Self::Changes),
            "active" | "pressed" => Ok(Self::Active),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// Configuration for the PrinterTransport
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
    /// Filter for selective display
    pub filter: ReportFilter,
}

impl PrinterConfig {
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    pub fn with_filter(mut self, filter: ReportFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// One-line decoded form of a report, e.g. `hat=Right buttons=A L=(128,128) R=(128,128)`
pub fn describe_report(report: &InputReport) -> String {
    let (lx, ly) = report.left_stick();
    let (rx, ry) = report.right_stick();
    format!(
        "hat={} buttons={} L=({},{}) R=({},{})",
        report.hat(),
        report.buttons(),
        lx,
        ly,
        rx,
        ry
    )
}

/// Hex dump of a report's wire bytes, e.g. `00 00 08 80 80 80 80 00`
pub fn hex_report(report: &InputReport) -> String {
    report
        .to_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transport middleware that prints all reports
pub struct PrinterTransport {
    inner: Arc<dyn ReportTransport>,
    config: PrinterConfig,
    seq: Mutex<PrinterState>,
}

#[derive(Default)]
struct PrinterState {
    count: u64,
    last: Option<InputReport>,
}

impl PrinterTransport {
    /// Wrap a transport with printing middleware
    pub fn wrap(
        transport: Arc<dyn ReportTransport>,
        config: PrinterConfig,
    ) -> Arc<dyn ReportTransport> {
        Arc::new(Self {
            inner: transport,
            config,
            seq: Mutex::new(PrinterState::default()),
        })
    }

    fn should_show(&self, report: &InputReport, last: Option<&InputReport>) -> bool {
        match self.config.filter {
            ReportFilter::All => true,
            ReportFilter::Changes => last != Some(report),
            ReportFilter::Active => !report.is_neutral(),
        }
    }

    fn print_input(&self, report: &InputReport) {
        let mut state = self.seq.lock();
        let index = state.count;
        state.count += 1;
        let show = self.should_show(report, state.last.as_ref());
        state.last = Some(*report);
        drop(state);

        if !show {
            return;
        }

        eprintln!(
            "{} {} {:>8}  {}",
            ">>>".cyan(),
            "IN".cyan().bold(),
            index,
            describe_report(report)
        );
        if self.config.show_hex {
            eprintln!("    {}  {}", "HEX".dim(), hex_report(report));
        }
    }

    fn print_output(&self, report: &OutputReport) {
        eprintln!(
            "{} {}  {:02x?} {}",
            "<<<".green(),
            "OUT".green().bold(),
            report.data,
            "(dropped)".dim()
        );
    }
}

#[async_trait]
impl ReportTransport for PrinterTransport {
    async fn send_input(&self, report: &InputReport) -> Result<(), TransportError> {
        self.print_input(report);
        self.inner.send_input(report).await
    }

    async fn poll_output(&self) -> Result<Option<OutputReport>, TransportError> {
        let report = self.inner.poll_output().await?;
        if let Some(ref r) = report {
            self.print_output(r);
        }
        Ok(report)
    }

    fn describe(&self) -> String {
        format!("printer({})", self.inner.describe())
    }
}
