//! # System Constants
//!
//! Core constants and enums that define the operational boundaries of the
//! complaint orchestration system.

use serde::{Deserialize, Serialize};

// Re-export state type for convenience
pub use crate::state_machine::ComplaintState as ComplaintStatus;

/// Lifecycle events published on the event channel and consumed by the
/// notification collaborator.
pub mod events {
    // Complaint lifecycle events
    pub const COMPLAINT_SUBMITTED: &str = "complaint.submitted";
    pub const COMPLAINT_ASSIGNED: &str = "complaint.assigned";
    pub const COMPLAINT_IN_PROGRESS: &str = "complaint.in_progress";
    pub const COMPLAINT_RESOLVED: &str = "complaint.resolved";
    pub const COMPLAINT_REJECTED: &str = "complaint.rejected";
    pub const COMPLAINT_PENDING_MANUAL_ROUTING: &str = "complaint.pending_manual_routing";
    pub const COMPLAINT_RECLASSIFIED: &str = "complaint.reclassified";

    // Routing events
    pub const ROUTING_ATTEMPT_FAILED: &str = "routing.attempt_failed";
    pub const ROUTING_EXHAUSTED: &str = "routing.exhausted";
    pub const ROUTING_NO_MAPPING: &str = "routing.no_mapping";

    // Offline sync events
    pub const SYNC_DRAFT_SYNCED: &str = "sync.draft_synced";
    pub const SYNC_DRAFT_FAILED: &str = "sync.draft_failed";
    pub const SYNC_DRAFT_DUPLICATE: &str = "sync.draft_duplicate";
}

/// Notification kinds accepted by the notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Confirmation,
    StatusUpdate,
    Resolution,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "confirmation",
            NotificationKind::StatusUpdate => "status_update",
            NotificationKind::Resolution => "resolution",
        }
    }
}

/// Dedup window applied to offline draft resubmissions, in hours.
pub const DEDUP_RETENTION_HOURS: i64 = 24;
