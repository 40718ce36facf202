//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Build the songplays star schema from song metadata and event logs
#[derive(Parser, Debug)]
#[command(name = "songplay-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML). Without it, defaults and environment
    /// variables are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
