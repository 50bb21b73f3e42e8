//! Command handlers for the CLI application.
//!
//! - `run`: drive the gadget (or a dry-run sink)
//! - `inspect`: offline commands (preview, dump, check, init-config)

pub mod inspect;
pub mod run;

use anyhow::Result;
use pokken_report::{PrinterConfig, ReportFilter};

/// Build the report printer config from `--print` / `--hex`.
/// Returns `None` when printing is off.
pub fn create_printer_config(print: Option<&str>, hex: bool) -> Result<Option<PrinterConfig>> {
    let Some(filter) = print else {
        return Ok(None);
    };
    let filter: ReportFilter = filter.parse().map_err(anyhow::Error::msg)?;
    Ok(Some(
        PrinterConfig::default().with_hex(hex).with_filter(filter),
    ))
}
