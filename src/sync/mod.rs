//! Offline sync: FIFO reconciliation of client-queued drafts and the
//! submission-idempotency ledger that keeps retried drafts from creating
//! duplicate complaints.

pub mod ledger;
pub mod reconciler;

pub use ledger::IdempotencyLedger;
pub use reconciler::{DraftSyncOutcome, OfflineSyncReconciler};
