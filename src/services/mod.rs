//! # Collaborator Contracts
//!
//! Narrow trait seams for the external systems the core drives: department
//! work-order endpoints, the notification channel, and the durable complaint
//! store. The core owns retry policy around the endpoint and store; delivery
//! failures on the notification channel are logged and never block a
//! transition.

pub mod memory_store;

use crate::constants::NotificationKind;
use crate::models::{Complaint, ComplaintType, Department};
use crate::state_machine::ComplaintState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory_store::InMemoryComplaintStore;

/// Failure modes of a department work-order endpoint. All are treated as
/// transient by the routing retry policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EndpointError {
    #[error("department endpoint timed out")]
    Timeout,
    #[error("department endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("malformed response from department endpoint: {0}")]
    MalformedResponse(String),
}

/// A department's work-order system.
#[async_trait]
pub trait DepartmentEndpoint: Send + Sync {
    /// Create a work order for the complaint; returns the external work order id.
    async fn create_work_order(
        &self,
        department: &Department,
        complaint: &Complaint,
    ) -> Result<String, EndpointError>;
}

/// Request handed to the notification collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub complaint_id: Uuid,
    pub kind: NotificationKind,
    pub contact: Option<String>,
}

/// Escalation sent to administrators when routing cannot proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAlert {
    pub complaint_id: Uuid,
    pub complaint_type: ComplaintType,
    pub reason: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Notification delivery channel. Outcomes are logged by the caller; a failed
/// delivery never blocks or reverses a state transition.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotificationError>;
    async fn notify_admins(&self, alert: AdminAlert) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store write failed: {0}")]
    WriteFailed(String),
    #[error("complaint {0} already exists")]
    DuplicateId(Uuid),
}

/// Conjunctive dashboard filter: every present field must match. Returns the
/// full matching set; pagination is a presentation concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintFilter {
    pub complaint_type: Option<ComplaintType>,
    pub status: Option<ComplaintState>,
    pub department_id: Option<String>,
    pub submitted_after: Option<DateTime<Utc>>,
    pub submitted_before: Option<DateTime<Utc>>,
}

impl ComplaintFilter {
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if let Some(complaint_type) = self.complaint_type {
            if complaint.complaint_type != complaint_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if complaint.status != status {
                return false;
            }
        }
        if let Some(department_id) = &self.department_id {
            match &complaint.routing {
                Some(routing) if &routing.department_id == department_id => {}
                _ => return false,
            }
        }
        if let Some(after) = self.submitted_after {
            if complaint.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.submitted_before {
            if complaint.created_at > before {
                return false;
            }
        }
        true
    }
}

/// Durable store for complaints: the persistence collaborator seam.
///
/// Reads must not block writers and vice versa; dashboard readers tolerate
/// slightly stale data.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Insert a new complaint; fails on id collision.
    async fn insert(&self, complaint: Complaint) -> Result<(), StoreError>;
    async fn load(&self, complaint_id: Uuid) -> Result<Option<Complaint>, StoreError>;
    /// Replace the stored record for an existing complaint.
    async fn update(&self, complaint: Complaint) -> Result<(), StoreError>;
    /// All complaints matching the conjunctive filter, ordered by creation time.
    async fn query(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, StoreError>;
}
