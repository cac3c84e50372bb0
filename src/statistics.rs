//! Weighted mean and population variance over a delay histogram

use crate::error::{DelayError, Result};
use crate::histogram::DelayHistogram;
use serde::{Deserialize, Serialize};

/// Summary statistics of one histogram snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    /// Population variance, weighted by occurrence count
    pub variance: f64,
}

impl Statistics {
    /// Compute mean and variance, each delay weighted by its count
    ///
    /// Fails with [`DelayError::EmptyDataset`] when the histogram holds no
    /// occurrences.
    pub fn from_histogram(histogram: &DelayHistogram) -> Result<Self> {
        let total = histogram.total_occurrences();
        if total == 0 {
            return Err(DelayError::EmptyDataset);
        }
        let n = total as f64;

        let weighted_sum: f64 = histogram
            .entries()
            .map(|(delay, count)| delay as f64 * count as f64)
            .sum();
        let mean = weighted_sum / n;

        let squared_deviations: f64 = histogram
            .entries()
            .map(|(delay, count)| {
                let deviation = delay as f64 - mean;
                count as f64 * deviation * deviation
            })
            .sum();

        Ok(Self {
            mean,
            variance: squared_deviations / n,
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}
