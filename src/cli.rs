// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// The crawl itself is configured by a TOML file (see config.rs); the command
// line only says where that file is and how to report the result.
//
//   site-mirror                       # reads ./site-mirror.toml
//   site-mirror --config prod.toml    # another config file
//   site-mirror --json -v             # JSON report, debug logging
// =============================================================================

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::Level;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Freeze a server-rendered website into a static, file-based mirror",
    long_about = "site-mirror crawls a website from a seed URL, writes every same-origin page \
                  to <output>/<path>/index.html and follows links until nothing new is left."
)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print the crawl report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
