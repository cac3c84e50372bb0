use anyhow::{Context, Result};
use clap::Parser;
use nfdelay::{
    chart,
    cli::{Cli, Command, OutputFormat},
    config::DelayConfig,
    correlator::{self, CorrelationReport},
    histogram::DelayHistogram,
    statistics::Statistics,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to TRACE
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DelayConfig> {
    match path {
        Some(path) => DelayConfig::from_file(path),
        None => Ok(DelayConfig::default()),
    }
}

/// Open `path` for writing, or stdout when no path is given
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Print the statistics summary to stderr
fn print_summary(report: &CorrelationReport) {
    let counters = &report.counters;
    eprintln!(
        "lines: {} | sockaddr: {} | netfilter: {} | matched: {} | unmatched: {}",
        counters.lines_read,
        counters.sockaddr_records,
        counters.netfilter_records,
        counters.matched,
        report.unmatched_pending
    );

    match Statistics::from_histogram(&report.histogram) {
        Ok(stats) => {
            eprintln!("mean: {:.6}", stats.mean);
            eprintln!("variance: {:.6}", stats.variance);
        }
        Err(e) => eprintln!("statistics unavailable: {}", e),
    }
}

fn run_correlate(
    mut config: DelayConfig,
    log: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    stats: bool,
    max_age: Option<u64>,
) -> Result<()> {
    if max_age.is_some() {
        config.pending_max_age = max_age;
    }
    config.validate()?;

    let report = correlator::correlate_file(log, &config)?;

    let out = open_output(output)?;
    let written = report.write_output(format, out);

    if stats && format == OutputFormat::Text {
        print_summary(&report);
    }

    written
}

fn read_histogram(path: &Path) -> Result<DelayHistogram> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open histogram file {}", path.display()))?;
    DelayHistogram::parse_text(BufReader::new(file)).context("Failed to read histogram file")
}

fn run_cdf(config: &DelayConfig, histogram: &Path, fraction: Option<f64>) -> Result<()> {
    let histogram = read_histogram(histogram)?;
    let out = BufWriter::new(io::stdout().lock());
    chart::write_cdf_series(&histogram, fraction.unwrap_or(config.cdf_fraction), out)?;
    Ok(())
}

fn run_bars(config: &DelayConfig, histogram: &Path, fraction: Option<f64>) -> Result<()> {
    let histogram = read_histogram(histogram)?;
    let out = BufWriter::new(io::stdout().lock());
    chart::write_bar_series(&histogram, fraction.unwrap_or(config.bar_fraction), out)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Correlate {
            log,
            output,
            format,
            stats,
            max_age,
        } => run_correlate(config, &log, output.as_deref(), format, stats, max_age),
        Command::Cdf {
            histogram,
            fraction,
        } => run_cdf(&config, &histogram, fraction),
        Command::Bars {
            histogram,
            fraction,
        } => run_bars(&config, &histogram, fraction),
    }
}
