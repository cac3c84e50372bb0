//! nfdelay - audit log delay correlation
//!
//! Pairs each `SOCKADDR` record with the first later `NETFILTER_PKT` record
//! for the same destination and builds a histogram of the line distance
//! between them, plus weighted mean/variance and chart series over it.

pub mod address;
pub mod chart;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod correlator;
pub mod error;
pub mod histogram;
pub mod json_output;
pub mod pending;
pub mod statistics;

pub use address::AddressKey;
pub use correlator::{correlate_file, CorrelationReport, LogCorrelator};
pub use error::{DelayError, Result};
pub use histogram::DelayHistogram;
pub use statistics::Statistics;
