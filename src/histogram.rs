//! Delay histogram and its `<delay> : <count>` text format
//!
//! The text format is the contract with the chart tools: one line per
//! observed delay, ascending. [`DelayHistogram::parse_text`] is the reader
//! those tools use; lines not matching `^(\d+)\s:\s(\d+)$` are skipped.

use regex::Regex;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::sync::OnceLock;

/// Line pattern accepted by the chart readers
pub const HISTOGRAM_LINE_PATTERN: &str = r"^(\d+)\s:\s(\d+)$";

/// Compiled once per process and shared by every reader
fn histogram_line_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(HISTOGRAM_LINE_PATTERN).expect("HISTOGRAM_LINE_PATTERN is a valid regex")
    })
}

/// Occurrence count per delay, kept in ascending delay order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelayHistogram {
    counts: BTreeMap<i64, u64>,
    total: u64,
}

impl DelayHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `delay`
    pub fn increment(&mut self, delay: i64) {
        *self.counts.entry(delay).or_insert(0) += 1;
        self.total += 1;
    }

    /// `(delay, count)` pairs in ascending delay order
    pub fn entries(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.counts.iter().map(|(&delay, &count)| (delay, count))
    }

    /// `(delay, count)` pairs with `delay >= min`, ascending
    pub fn entries_from(&self, min: i64) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.counts.range(min..).map(|(&delay, &count)| (delay, count))
    }

    /// Count recorded for `delay` (0 if never seen)
    pub fn count(&self, delay: i64) -> u64 {
        self.counts.get(&delay).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total_occurrences(&self) -> u64 {
        self.total
    }

    /// Largest delay present, `None` for an empty histogram
    pub fn max_delay(&self) -> Option<i64> {
        self.counts.keys().next_back().copied()
    }

    /// Number of distinct delays
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Write the histogram as `<delay> : <count>` lines
    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (delay, count) in self.entries() {
            writeln!(out, "{} : {}", delay, count)?;
        }
        out.flush()
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Read a histogram from its text form
    ///
    /// Malformed lines (including negative delays, which the readers do not
    /// accept) are skipped. A repeated delay replaces the earlier count.
    pub fn parse_text<R: BufRead>(reader: R) -> io::Result<Self> {
        let pattern = histogram_line_regex();
        let mut histogram = Self::new();

        for line in reader.lines() {
            let line = line?;
            let Some(caps) = pattern.captures(&line) else {
                continue;
            };
            let (Ok(delay), Ok(count)) = (caps[1].parse::<i64>(), caps[2].parse::<u64>()) else {
                continue;
            };
            histogram.set_count(delay, count);
        }

        Ok(histogram)
    }

    fn set_count(&mut self, delay: i64, count: u64) {
        let previous = if count == 0 {
            self.counts.remove(&delay)
        } else {
            self.counts.insert(delay, count)
        };
        self.total = (self.total - previous.unwrap_or(0)).saturating_add(count);
    }
}
