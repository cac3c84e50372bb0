//! Pending SOCKADDR sightings awaiting their first NETFILTER_PKT

use crate::address::AddressKey;
use std::collections::HashMap;

/// Maps an address key to the line of its latest unmatched SOCKADDR
///
/// At most one entry exists per key: a second SOCKADDR for a pending key
/// replaces the earlier line number.
#[derive(Debug, Default)]
pub struct PendingMatchTable {
    entries: HashMap<AddressKey, u64>,
}

impl PendingMatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a SOCKADDR sighting, replacing any pending entry for `key`
    ///
    /// Returns the line number that was overwritten, if any.
    pub fn record(&mut self, key: AddressKey, line: u64) -> Option<u64> {
        self.entries.insert(key, line)
    }

    /// Consume the pending entry for `key` and return `line - pending_line`
    ///
    /// Returns `None` when nothing is pending for `key`, which is the normal
    /// case for unrelated traffic.
    pub fn try_match(&mut self, key: &AddressKey, line: u64) -> Option<i64> {
        self.entries
            .remove(key)
            .map(|pending| line as i64 - pending as i64)
    }

    /// Drop entries recorded more than `max_age` lines before `line`
    ///
    /// Returns the number of evicted entries.
    pub fn evict_older_than(&mut self, line: u64, max_age: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, pending| line.saturating_sub(*pending) <= max_age);
        before - self.entries.len()
    }

    pub fn is_pending(&self, key: &AddressKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of SOCKADDR sightings still waiting for a packet
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
