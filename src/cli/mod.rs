//! CLI module
//!
//! Command-line interface for running the ETL job. There are no subcommands:
//! one invocation is one run.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
