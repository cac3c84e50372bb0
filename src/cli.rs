//! CLI argument parsing for nfdelay

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for correlation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<delay> : <count>` histogram lines (default)
    Text,
    /// JSON report with histogram, statistics and counters
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "nfdelay")]
#[command(version)]
#[command(about = "Measure SOCKADDR to NETFILTER_PKT delays in audit logs", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Correlate an audit log and emit the delay histogram
    Correlate {
        /// Audit log to process
        #[arg(value_name = "LOG")]
        log: PathBuf,

        /// Write the histogram to FILE instead of stdout
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,

        /// Print mean and variance to stderr (text format)
        #[arg(short = 's', long = "stats")]
        stats: bool,

        /// Drop pending SOCKADDR records older than N lines
        #[arg(long = "max-age", value_name = "LINES")]
        max_age: Option<u64>,
    },

    /// Print the cumulative distribution series of a histogram file
    Cdf {
        /// Histogram file in `<delay> : <count>` format
        #[arg(value_name = "HISTOGRAM")]
        histogram: PathBuf,

        /// Stop once this cumulative probability is reached
        #[arg(long = "fraction", value_name = "FRACTION")]
        fraction: Option<f64>,
    },

    /// Print the per-delay bar series of a histogram file
    Bars {
        /// Histogram file in `<delay> : <count>` format
        #[arg(value_name = "HISTOGRAM")]
        histogram: PathBuf,

        /// Stop once this share of occurrences is covered
        #[arg(long = "fraction", value_name = "FRACTION")]
        fraction: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_correlate() {
        let cli = Cli::parse_from(["nfdelay", "correlate", "/var/log/audit/audit.log"]);
        match cli.command {
            Command::Correlate {
                log,
                output,
                format,
                stats,
                max_age,
            } => {
                assert_eq!(log, PathBuf::from("/var/log/audit/audit.log"));
                assert!(output.is_none());
                assert_eq!(format, OutputFormat::Text);
                assert!(!stats);
                assert!(max_age.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_correlate_options() {
        let cli = Cli::parse_from([
            "nfdelay",
            "correlate",
            "audit.log",
            "-o",
            "delayMap",
            "--format",
            "json",
            "--stats",
            "--max-age",
            "1000",
        ]);
        match cli.command {
            Command::Correlate {
                output,
                format,
                stats,
                max_age,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("delayMap")));
                assert_eq!(format, OutputFormat::Json);
                assert!(stats);
                assert_eq!(max_age, Some(1000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["nfdelay", "cdf", "delayMap", "--debug", "--config", "x.toml"]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_cli_bars_fraction() {
        let cli = Cli::parse_from(["nfdelay", "bars", "delayMap", "--fraction", "0.5"]);
        match cli.command {
            Command::Bars {
                histogram,
                fraction,
            } => {
                assert_eq!(histogram, PathBuf::from("delayMap"));
                assert_eq!(fraction, Some(0.5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["nfdelay"]).is_err());
    }
}
