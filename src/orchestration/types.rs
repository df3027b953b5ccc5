//! Core types shared across the orchestration components: submission inputs,
//! routing results, and attempt audit records.

use crate::models::{Classification, Complaint, Location};
use crate::resilience::AttemptOutcome;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Input to the submission pipeline: a classified, geolocated complaint with a
/// stored photo reference.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub classification: Classification,
    pub location: Location,
    pub photo_ref: String,
    pub contact: Option<String>,
    /// Stable client-assigned idempotency key, present for offline drafts.
    pub local_id: Option<String>,
}

/// Routing outcome reported by the routing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStatus {
    /// Work order created, complaint assigned
    Routed,
    /// Escalated to the manual-routing queue; also reported while a retry
    /// pass is still in flight
    Queued,
    /// Internal error applying the routing outcome
    Failed,
}

/// Why routing could not assign the complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "code", content = "detail")]
pub enum RoutingFailure {
    NoMapping,
    RoutingExhausted { attempts: u32 },
}

impl RoutingFailure {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoMapping => "NoMapping",
            Self::RoutingExhausted { .. } => "RoutingExhausted",
        }
    }
}

/// Audit record for one work-order creation attempt. Kept for the retry
/// window and audit logging, not persisted on the complaint.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingAttempt {
    pub complaint_id: Uuid,
    pub attempt_number: u32,
    pub scheduled_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

/// Result of a full routing pass.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingResult {
    pub status: RoutingStatus,
    pub department_id: Option<String>,
    pub work_order_id: Option<String>,
    pub failure: Option<RoutingFailure>,
    pub attempts: Vec<RoutingAttempt>,
}

impl RoutingResult {
    pub fn routed(
        department_id: String,
        work_order_id: String,
        attempts: Vec<RoutingAttempt>,
    ) -> Self {
        Self {
            status: RoutingStatus::Routed,
            department_id: Some(department_id),
            work_order_id: Some(work_order_id),
            failure: None,
            attempts,
        }
    }

    pub fn queued(failure: RoutingFailure, attempts: Vec<RoutingAttempt>) -> Self {
        Self {
            status: RoutingStatus::Queued,
            department_id: None,
            work_order_id: None,
            failure: Some(failure),
            attempts,
        }
    }
}

/// Result of an ingestion attempt: either a newly created complaint or the
/// original one for a repeated `local_id` inside the dedup window.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Created(Complaint),
    Duplicate(Complaint),
}

impl SubmissionOutcome {
    pub fn complaint(&self) -> &Complaint {
        match self {
            Self::Created(c) | Self::Duplicate(c) => c,
        }
    }

    pub fn into_complaint(self) -> Complaint {
        match self {
            Self::Created(c) | Self::Duplicate(c) => c,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}
