//! Single-pass SOCKADDR / NETFILTER_PKT correlation over an audit log
//!
//! Each line gets a 1-based number in file order. A SOCKADDR record opens a
//! pending window for its address; the next NETFILTER_PKT for the same
//! address closes it and contributes `packet_line - sockaddr_line` to the
//! delay histogram. Line order is load-bearing, so a run is strictly
//! sequential and owns all of its state.

use crate::address::{encode_from_netfilter, encode_from_sockaddr, AddressKey};
use crate::classifier::{Record, RecordClassifier};
use crate::cli::OutputFormat;
use crate::config::DelayConfig;
use crate::error::{DelayError, Result};
use crate::histogram::DelayHistogram;
use crate::json_output::JsonReport;
use crate::pending::PendingMatchTable;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Per-run record counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationCounters {
    pub lines_read: u64,
    pub sockaddr_records: u64,
    pub netfilter_records: u64,
    /// Recognized records whose address could not be encoded
    pub malformed_records: u64,
    pub matched: u64,
    /// Pending SOCKADDR entries replaced by a newer one for the same address
    pub overwritten: u64,
    /// Pending entries dropped by the age horizon
    pub evicted: u64,
    pub negative_delays: u64,
}

/// Result of one correlation run
#[derive(Debug)]
pub struct CorrelationReport {
    pub histogram: DelayHistogram,
    pub counters: CorrelationCounters,
    /// SOCKADDR sightings never followed by a matching packet
    pub unmatched_pending: usize,
    /// Read failure that stopped the run early; the histogram is partial
    pub interrupted: Option<DelayError>,
}

impl CorrelationReport {
    pub fn is_partial(&self) -> bool {
        self.interrupted.is_some()
    }

    /// Write the histogram text or the JSON report to `out`
    ///
    /// An interrupted report is still written and flushed in full; the
    /// interruption then comes back as the error so the process exits non-zero.
    pub fn write_output<W: Write>(&self, format: OutputFormat, mut out: W) -> anyhow::Result<()> {
        match format {
            OutputFormat::Text => self
                .histogram
                .write_text(&mut out)
                .context("Failed to write histogram")?,
            OutputFormat::Json => {
                let json = JsonReport::from_report(self).to_json()?;
                writeln!(out, "{}", json).context("Failed to write JSON report")?;
                out.flush().context("Failed to write JSON report")?;
            }
        }

        if let Some(err) = &self.interrupted {
            anyhow::bail!(
                "{}; {} occurrences written as partial results",
                err,
                self.histogram.total_occurrences()
            );
        }

        Ok(())
    }
}

/// Drives classification, pending-match bookkeeping and histogram updates
#[derive(Debug)]
pub struct LogCorrelator {
    classifier: RecordClassifier,
    pending: PendingMatchTable,
    histogram: DelayHistogram,
    counters: CorrelationCounters,
    line_no: u64,
    max_age: Option<u64>,
    warn_on_negative_delay: bool,
}

impl LogCorrelator {
    pub fn new(config: &DelayConfig) -> Self {
        Self {
            classifier: RecordClassifier::new(),
            pending: PendingMatchTable::new(),
            histogram: DelayHistogram::new(),
            counters: CorrelationCounters::default(),
            line_no: 0,
            max_age: config.pending_max_age.filter(|&age| age > 0),
            warn_on_negative_delay: config.warn_on_negative_delay,
        }
    }

    /// Process the next line of the log
    ///
    /// The line number advances whether or not the line is a known record.
    pub fn process_line(&mut self, line: &str) {
        self.line_no += 1;
        self.counters.lines_read += 1;
        let line_no = self.line_no;

        match self.classifier.classify(line) {
            Record::Sockaddr { saddr } => {
                self.counters.sockaddr_records += 1;
                match encode_from_sockaddr(saddr) {
                    Ok(key) => {
                        if self.pending.record(key, line_no).is_some() {
                            self.counters.overwritten += 1;
                        }
                    }
                    Err(e) => {
                        // Non-IPv4 sockets (AF_UNIX, AF_NETLINK) land here routinely
                        self.counters.malformed_records += 1;
                        tracing::trace!(line = line_no, "skipping SOCKADDR: {}", e);
                    }
                }
            }
            Record::NetfilterPkt { daddr, dport } => {
                self.counters.netfilter_records += 1;
                match encode_from_netfilter(daddr, dport) {
                    Ok(key) => {
                        if let Some(delay) = self.pending.try_match(&key, line_no) {
                            self.record_delay(&key, line_no, delay);
                        }
                    }
                    Err(e) => {
                        self.counters.malformed_records += 1;
                        tracing::trace!(line = line_no, "skipping NETFILTER_PKT: {}", e);
                    }
                }
            }
            Record::Other => {}
        }

        if let Some(max_age) = self.max_age {
            if line_no % max_age == 0 {
                self.counters.evicted += self.pending.evict_older_than(line_no, max_age) as u64;
            }
        }
    }

    fn record_delay(&mut self, key: &AddressKey, line_no: u64, delay: i64) {
        if let Some(max_age) = self.max_age {
            if delay > max_age as i64 {
                self.counters.evicted += 1;
                tracing::debug!(key = %key, line = line_no, delay, "pending entry past age horizon");
                return;
            }
        }

        if delay < 0 {
            self.counters.negative_delays += 1;
            if self.warn_on_negative_delay {
                tracing::warn!(key = %key, line = line_no, delay, "packet precedes its SOCKADDR record");
            }
        }

        tracing::debug!(key = %key, line = line_no, delay, "matched SOCKADDR to NETFILTER_PKT");
        self.histogram.increment(delay);
        self.counters.matched += 1;
    }

    /// Consume every line of `reader` and produce the report
    ///
    /// A read failure stops the run; everything aggregated up to that point
    /// is kept and the failure is recorded in [`CorrelationReport::interrupted`].
    pub fn run<R: BufRead>(mut self, mut reader: R) -> CorrelationReport {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return self.finish(None),
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    self.process_line(line.trim_end_matches(['\n', '\r']));
                }
                Err(source) => {
                    let failed_line = self.line_no + 1;
                    tracing::warn!(
                        line = failed_line,
                        "read failure, reporting partial results: {}",
                        source
                    );
                    return self.finish(Some(DelayError::Read {
                        line: failed_line,
                        source,
                    }));
                }
            }
        }
    }

    /// Stop processing and hand over the accumulated state
    pub fn finish(self, interrupted: Option<DelayError>) -> CorrelationReport {
        tracing::debug!(
            lines = self.counters.lines_read,
            matched = self.counters.matched,
            unmatched = self.pending.len(),
            "correlation finished"
        );

        CorrelationReport {
            histogram: self.histogram,
            counters: self.counters,
            unmatched_pending: self.pending.len(),
            interrupted,
        }
    }

    pub fn histogram(&self) -> &DelayHistogram {
        &self.histogram
    }

    pub fn pending(&self) -> &PendingMatchTable {
        &self.pending
    }

    pub fn counters(&self) -> &CorrelationCounters {
        &self.counters
    }

    /// Number of the last processed line (0 before any input)
    pub fn line_number(&self) -> u64 {
        self.line_no
    }
}

/// Open `path` and correlate it
///
/// Fails with [`DelayError::SourceUnavailable`] before processing anything if
/// the file cannot be opened, is a directory, or fails on its very first read.
pub fn correlate_file<P: AsRef<Path>>(path: P, config: &DelayConfig) -> Result<CorrelationReport> {
    let path = path.as_ref();
    let unavailable = |source: io::Error| DelayError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unavailable)?;
    let metadata = file.metadata().map_err(unavailable)?;
    if metadata.is_dir() {
        return Err(unavailable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }

    tracing::debug!(path = %path.display(), "correlating audit log");
    let report = LogCorrelator::new(config).run(BufReader::new(file));

    // Nothing was consumed, so there is no partial result to report
    if report.counters.lines_read == 0 {
        if let Some(DelayError::Read { source, .. }) = report.interrupted {
            return Err(unavailable(source));
        }
    }
    Ok(report)
}
