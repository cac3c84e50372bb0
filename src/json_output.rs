//! JSON output format for correlation reports

use crate::correlator::{CorrelationCounters, CorrelationReport};
use crate::statistics::Statistics;
use serde::{Deserialize, Serialize};

/// One histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonHistogramEntry {
    pub delay: i64,
    pub count: u64,
}

/// Complete JSON report for a correlation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Buckets in ascending delay order
    pub histogram: Vec<JsonHistogramEntry>,
    pub total_occurrences: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<i64>,
    /// Absent when nothing matched
    pub statistics: Option<Statistics>,
    #[serde(flatten)]
    pub counters: CorrelationCounters,
    pub unmatched_pending: usize,
    /// Set when a read failure cut the run short
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<String>,
}

impl JsonReport {
    pub fn from_report(report: &CorrelationReport) -> Self {
        let histogram = &report.histogram;
        Self {
            histogram: histogram
                .entries()
                .map(|(delay, count)| JsonHistogramEntry { delay, count })
                .collect(),
            total_occurrences: histogram.total_occurrences(),
            max_delay: histogram.max_delay(),
            statistics: Statistics::from_histogram(histogram).ok(),
            counters: report.counters.clone(),
            unmatched_pending: report.unmatched_pending,
            interrupted: report.interrupted.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
