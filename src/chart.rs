//! Chart series built from a delay histogram
//!
//! Both series walk `delay = 1..=max_delay`, filling gaps with zero, and stop
//! once the occurrences seen so far reach `fraction` of the total. Delays
//! below 1 are not charted.

use crate::config::validate_fraction;
use crate::error::Result;
use crate::histogram::DelayHistogram;
use std::io::Write;

/// One point of the cumulative distribution: `P(X <= delay)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdfPoint {
    pub delay: i64,
    pub probability: f64,
}

/// One bar: occurrences observed for `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub delay: i64,
    pub count: u64,
}

/// Walk delays from 1 up, handing each count to `emit` until `fraction` is covered
///
/// Only observed delays are looked up; the gaps between them are emitted
/// as zero counts without touching the map.
fn walk_until_covered<F>(histogram: &DelayHistogram, fraction: f64, mut emit: F) -> Result<()>
where
    F: FnMut(i64, u64, u64) -> Result<()>,
{
    validate_fraction(fraction)?;

    let target = fraction * histogram.total_occurrences() as f64;
    let mut covered = 0u64;
    let mut next = 1i64;

    for (delay, count) in histogram.entries_from(1) {
        if covered as f64 >= target {
            break;
        }
        for gap in next..delay {
            emit(gap, 0, covered)?;
        }
        covered += count;
        emit(delay, count, covered)?;
        next = delay.saturating_add(1);
    }

    Ok(())
}

/// Cumulative distribution points up to the `fraction` completeness mark
pub fn cdf_series(histogram: &DelayHistogram, fraction: f64) -> Result<Vec<CdfPoint>> {
    let total = histogram.total_occurrences() as f64;
    let mut points = Vec::new();

    walk_until_covered(histogram, fraction, |delay, _, covered| {
        points.push(CdfPoint {
            delay,
            probability: covered as f64 / total,
        });
        Ok(())
    })?;

    Ok(points)
}

/// Per-delay bars, missing delays as zero, up to the `fraction` coverage mark
pub fn bar_series(histogram: &DelayHistogram, fraction: f64) -> Result<Vec<Bar>> {
    let mut bars = Vec::new();

    walk_until_covered(histogram, fraction, |delay, count, _| {
        bars.push(Bar { delay, count });
        Ok(())
    })?;

    Ok(bars)
}

/// Stream the CDF as `<delay>\t<probability>` lines
pub fn write_cdf_series<W: Write>(
    histogram: &DelayHistogram,
    fraction: f64,
    mut out: W,
) -> Result<()> {
    let total = histogram.total_occurrences() as f64;

    walk_until_covered(histogram, fraction, |delay, _, covered| {
        writeln!(out, "{}\t{:.6}", delay, covered as f64 / total)?;
        Ok(())
    })?;

    out.flush()?;
    Ok(())
}

/// Stream the bars as `<delay>\t<count>` lines
pub fn write_bar_series<W: Write>(
    histogram: &DelayHistogram,
    fraction: f64,
    mut out: W,
) -> Result<()> {
    walk_until_covered(histogram, fraction, |delay, count, _| {
        writeln!(out, "{}\t{}", delay, count)?;
        Ok(())
    })?;

    out.flush()?;
    Ok(())
}
