//! CLI runner - loads the config and executes the job

use crate::cli::commands::Cli;
use crate::config::EtlConfig;
use crate::error::Result;
use crate::job::{Job, RunReport};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load the config, run the job and print the report as JSON
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        debug!(?config, "Loaded configuration");

        let report = Job::new(&config).run().await?;
        info!(
            tables = report.tables.len(),
            songplays = report.matched_songplays + report.unmatched_songplays,
            "Job finished"
        );

        print_report(&report)
    }

    /// Read the config file when given, then overlay the environment
    fn load_config(&self) -> Result<EtlConfig> {
        let mut config = match &self.cli.config {
            Some(path) => EtlConfig::from_file(path)?,
            None => EtlConfig::default(),
        };
        config.apply_env();
        Ok(config)
    }
}

fn print_report(report: &RunReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_args() {
        let cli = Cli::parse_from(["songplay-etl", "--config", "etl.yaml", "-v"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("etl.yaml")));
        assert!(cli.verbose);

        let cli = Cli::parse_from(["songplay-etl"]);
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_rejects_subcommands() {
        assert!(Cli::try_parse_from(["songplay-etl", "read"]).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "source:\n  url: /data/in\ndestination:\n  url: /data/out\njoin:\n  duration_tolerance: 0.5"
        )
        .unwrap();

        let runner = Runner::new(Cli::parse_from([
            "songplay-etl",
            "-c",
            file.path().to_str().unwrap(),
        ]));
        let config = runner.load_config().unwrap();
        assert!((config.join.duration_tolerance - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_config_file() {
        let runner = Runner::new(Cli::parse_from(["songplay-etl", "-c", "/nonexistent/etl.yaml"]));
        assert!(matches!(
            runner.load_config(),
            Err(crate::Error::FileNotFound { .. })
        ));
    }
}
