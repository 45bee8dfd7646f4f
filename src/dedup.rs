//! Suppression of repeated sightings of the same client.

use std::collections::HashSet;

use crate::frame::DhcpRequestRecord;

/// History of every (MAC, IP, hostname) triple already reported this
/// session.
///
/// A record is novel only if no identical triple has been seen before; a
/// change in any single field (a renewed lease, a renamed host) makes
/// the client reportable again. There is no eviction: history lives for
/// the session and its cardinality is bounded by the number of distinct
/// client identities on the LAN.
///
/// Owned and mutated exclusively by the capture loop, so it needs no
/// internal synchronization.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<DhcpRequestRecord>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the sighting and reports whether it was previously unseen.
    pub fn is_novel(&mut self, record: &DhcpRequestRecord) -> bool {
        if self.seen.contains(record) {
            return false;
        }
        self.seen.insert(record.clone());
        true
    }

    /// Number of distinct identities seen this session.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
