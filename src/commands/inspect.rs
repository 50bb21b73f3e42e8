//! Offline command handlers: nothing here touches the gadget.

use anyhow::{bail, Context, Result};
use pokken_report::{describe_report, hex_report};
use std::path::Path;

use pokken_driver::config::DriverConfig;
use pokken_driver::preview::{dump_reports, paint_preview};
use pokken_driver::sequencer::{Payload, Sequencer};
use pokken_driver::traversal::{window_len, TraversalMode};

/// Write the default configuration file
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    DriverConfig::default().save(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Validate the configuration and print what it resolves to
pub fn check(config: &DriverConfig) -> Result<()> {
    let seq_config = config
        .build_sequencer()
        .context("Invalid configuration")?;
    let timing = seq_config.timing;
    let seq = Sequencer::new(seq_config);
    let marks = seq.marks();
    let sync = &seq.config().controller_sync;

    println!("Device:     {}", config.device.display());
    println!(
        "Timing:     echo {} / polling {} ms ({} ms quantum, {} polls per tick)",
        timing.echo_count,
        timing.polling_ms,
        timing.quantum_ms(),
        timing.polls_per_tick()
    );
    println!(
        "Sync:       {} ticks, {} at {:?}, {} at {:?}",
        marks.sync_total, sync.pair_buttons, marks.pair, sync.confirm_buttons, marks.confirm
    );

    match &seq.config().payload {
        Payload::Macro {
            script,
            loop_forever,
        } => {
            println!(
                "Payload:    macro, {} commands, {} ticks per pass{}",
                script.len(),
                script.total_ticks(),
                if *loop_forever { ", looping" } else { "" }
            );
            println!("Script:     {script}");
        }
        Payload::Raster {
            canvas,
            mode,
            ink_button,
            position_sync,
        } => {
            println!(
                "Payload:    raster {}x{}, {} ink pixels, {:?} walk, ink {}",
                canvas.width(),
                canvas.height(),
                canvas.ink_count(),
                mode,
                ink_button
            );
            println!(
                "Position:   {} ticks, {} at {:?}",
                marks.position_total, position_sync.clear_button, marks.clear
            );
            if *mode == TraversalMode::ZigZag {
                let ticks = u64::from(window_len(canvas.width())) * u64::from(canvas.height() / 2);
                println!("Traversal:  {} ticks", ticks);
            }
        }
    }

    println!("OK");
    Ok(())
}

/// Paint the raster payload offline
pub fn preview(config: &DriverConfig, output: Option<&Path>) -> Result<()> {
    let seq_config = config
        .build_sequencer()
        .context("Invalid configuration")?;
    let Payload::Raster { canvas, .. } = &seq_config.payload else {
        bail!("Preview needs a raster payload");
    };
    let Some(painted) = paint_preview(&seq_config) else {
        bail!("Preview needs a raster payload");
    };

    match output {
        Some(path) => {
            painted
                .to_image()
                .save(path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
            println!("Saved {}", path.display());
        }
        None => print!("{}", painted.to_ascii()),
    }

    if painted == *canvas {
        println!("Painted {} ink pixels, matches source", painted.ink_count());
    } else {
        println!(
            "Painted {} ink pixels, source has {}: traversal does not reproduce the canvas",
            painted.ink_count(),
            canvas.ink_count()
        );
    }
    Ok(())
}

/// Print the first `count` reports
pub fn dump(config: &DriverConfig, count: u64, hex: bool) -> Result<()> {
    let seq_config = config
        .build_sequencer()
        .context("Invalid configuration")?;
    let mut seq = Sequencer::new(seq_config);

    for entry in dump_reports(&mut seq, count) {
        let body = if hex {
            hex_report(&entry.report)
        } else {
            describe_report(&entry.report)
        };
        println!(
            "{:>8}  {:<14}  {}",
            entry.index,
            format!("{:?}", entry.phase),
            body
        );
    }
    Ok(())
}
