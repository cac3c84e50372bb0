//! Error types for delay correlation

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while correlating an audit log
#[derive(Error, Debug)]
pub enum DelayError {
    /// The log source could not be opened (fatal, nothing is processed)
    #[error("cannot open log source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed mid-stream at the given 1-based line
    #[error("read failure at line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: io::Error,
    },

    /// SOCKADDR `saddr` field too short to hold an IPv4 address and port
    #[error("malformed SOCKADDR address: {len} hex digits, need at least 48")]
    MalformedAddress { len: usize },

    /// NETFILTER_PKT `daddr`/`dport` outside the IPv4 address or port range
    #[error("malformed NETFILTER_PKT address: {daddr}:{dport}")]
    MalformedNetfilter { daddr: String, dport: String },

    /// Statistics requested over a histogram without occurrences
    #[error("empty dataset: no matched records")]
    EmptyDataset,

    /// Coverage fraction outside (0, 1]
    #[error("invalid fraction {0}: must be in (0, 1]")]
    InvalidFraction(f64),

    /// Writing a series or report failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for delay correlation operations
pub type Result<T> = std::result::Result<T, DelayError>;
