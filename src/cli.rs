// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pokken_driver")]
#[command(author, version, about = "Scripted Pokken/Switch controller over a Linux USB HID gadget")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/pokken/driver.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive the gadget until Ctrl-C (or the tick limit)
    #[command(visible_alias = "r")]
    Run {
        /// HID gadget node, overriding the config file
        #[arg(short, long)]
        device: Option<PathBuf>,

        /// Drop reports instead of opening the gadget
        #[arg(long)]
        dry_run: bool,

        /// Print every report (all, changes, active)
        #[arg(long, value_name = "FILTER", num_args = 0..=1, default_missing_value = "all")]
        print: Option<String>,

        /// Show raw hex alongside printed reports
        #[arg(long)]
        hex: bool,

        /// Stop after this many reports
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Stop once the sequence is done instead of idling
        #[arg(long)]
        exit_when_done: bool,
    },

    /// Paint the raster payload offline and show the result
    #[command(visible_alias = "p")]
    Preview {
        /// Save the painted canvas as an image instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the first reports the sequencer produces
    #[command(visible_alias = "d")]
    Dump {
        /// Number of reports (echoes included)
        #[arg(short = 'n', long, default_value_t = 64)]
        count: u64,

        /// Show raw hex instead of decoded fields
        #[arg(long)]
        hex: bool,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Load and validate the configuration
    Check,
}
