//! `run` command handler.

use anyhow::{Context, Result};
use pokken_report::{BoxedTransport, DiscardTransport, HidGadgetTransport, PrinterTransport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use pokken_driver::config::DriverConfig;
use pokken_driver::driver::{Pacing, PollingDriver};
use pokken_driver::indicator::{CompletionIndicator, LedIndicator, LogIndicator};
use pokken_driver::sequencer::Sequencer;

use super::create_printer_config;

pub struct RunOptions {
    pub device: Option<PathBuf>,
    pub dry_run: bool,
    pub print: Option<String>,
    pub hex: bool,
    pub max_ticks: Option<u64>,
    pub exit_when_done: bool,
}

pub async fn run(config: DriverConfig, options: RunOptions) -> Result<()> {
    let seq_config = config
        .build_sequencer()
        .context("Invalid configuration")?;
    let sequencer = Sequencer::new(seq_config);

    // The gadget write blocks until the host has polled, so it paces itself
    let (transport, pacing): (BoxedTransport, Pacing) = if options.dry_run {
        info!("Dry run: reports are discarded");
        let period = Duration::from_millis(u64::from(config.polling_ms));
        (Arc::new(DiscardTransport) as BoxedTransport, Pacing::Interval(period))
    } else {
        let device = options.device.unwrap_or_else(|| config.device.clone());
        let gadget = HidGadgetTransport::open(&device)
            .with_context(|| format!("Failed to open gadget {}", device.display()))?;
        (Arc::new(gadget) as BoxedTransport, Pacing::Unpaced)
    };

    let transport = match create_printer_config(options.print.as_deref(), options.hex)? {
        Some(printer) => PrinterTransport::wrap(transport, printer),
        None => transport,
    };

    let mut driver = PollingDriver::new(sequencer, transport)
        .with_pacing(pacing)
        .with_stop_when_done(options.exit_when_done);
    if let Some(max) = options.max_ticks {
        driver = driver.with_max_ticks(max);
    }
    if config.completion_signal {
        driver = driver.with_indicator(open_indicator(&config)?);
    }

    println!("Running. Ctrl+C to stop.");
    let stats = driver.run(shutdown_signal()).await?;

    println!(
        "Sent {} reports, dropped {} host packets{}",
        stats.sent,
        stats.discarded_output,
        if stats.finished { ", sequence finished" } else { "" }
    );
    Ok(())
}

fn open_indicator(config: &DriverConfig) -> Result<Box<dyn CompletionIndicator>> {
    match &config.led_path {
        Some(path) => {
            let led = LedIndicator::open(path)
                .with_context(|| format!("Failed to open LED {}", path.display()))?;
            Ok(Box::new(led))
        }
        None => Ok(Box::new(LogIndicator::new())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Ctrl+C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}
