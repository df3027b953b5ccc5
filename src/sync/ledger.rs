use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Submission-idempotency ledger keyed by draft `local_id`.
///
/// A draft retried after a partial failure (server accepted, acknowledgment
/// lost) hits its ledger entry inside the retention window and receives the
/// original complaint id instead of creating a second complaint. Entries
/// expire after the retention window; lookups prune lazily.
#[derive(Debug)]
pub struct IdempotencyLedger {
    entries: DashMap<String, LedgerEntry>,
    retention: Duration,
}

#[derive(Debug, Clone, Copy)]
struct LedgerEntry {
    complaint_id: Uuid,
    accepted_at: DateTime<Utc>,
}

impl IdempotencyLedger {
    pub fn new(retention: std::time::Duration) -> Self {
        Self {
            entries: DashMap::new(),
            retention: Duration::from_std(retention).unwrap_or_else(|_| Duration::hours(24)),
        }
    }

    /// The original complaint id for this local id, if recorded inside the
    /// retention window.
    pub fn lookup(&self, local_id: &str) -> Option<Uuid> {
        let now = Utc::now();
        if let Some(entry) = self.entries.get(local_id) {
            if now - entry.accepted_at <= self.retention {
                return Some(entry.complaint_id);
            }
        }
        self.entries
            .remove_if(local_id, |_, entry| now - entry.accepted_at > self.retention);
        None
    }

    /// Record an accepted submission.
    pub fn record(&self, local_id: impl Into<String>, complaint_id: Uuid) {
        self.entries.insert(
            local_id.into(),
            LedgerEntry {
                complaint_id,
                accepted_at: Utc::now(),
            },
        );
    }

    /// Drop all expired entries; returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.accepted_at <= self.retention);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
