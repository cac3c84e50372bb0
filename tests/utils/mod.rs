// Shared audit log fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const FILLER: &str =
    "type=SYSCALL msg=audit(1494523111.293:1661796): arch=c000003e syscall=42 success=yes exit=0";

/// SOCKADDR record for an AF_INET destination given as hex digits
pub fn sockaddr(ip_hex: &str, port_hex: &str) -> String {
    format!(
        "type=SOCKADDR msg=audit(1494523111.293:1661796): saddr=0200{port_hex}{}{ip_hex}",
        "0".repeat(32)
    )
}

/// NETFILTER_PKT record for a destination
pub fn netfilter(daddr: &str, dport: u16) -> String {
    format!(
        "type=NETFILTER_PKT msg=audit(1494469680.359:1606788): action=0 hook=1 len=76 inif=enp0s3 outif=? saddr=10.0.2.15 daddr={daddr} ipid=31284 proto=6 sport=40000 dport={dport}"
    )
}

/// Log text with `records` at the given 1-based lines and filler elsewhere
pub fn log_with(records: &[(u64, String)], total_lines: u64) -> String {
    (1..=total_lines)
        .map(|n| {
            records
                .iter()
                .find(|(line, _)| *line == n)
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| FILLER.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

/// Write `contents` to `name` inside a fresh temp dir
pub fn write_fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    (dir, path)
}
