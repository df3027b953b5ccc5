use crate::models::complaint::{Classification, Location};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync lifecycle of an offline draft on its originating client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Pending,
    Syncing,
    Failed,
    Synced,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Syncing => write!(f, "syncing"),
            Self::Failed => write!(f, "failed"),
            Self::Synced => write!(f, "synced"),
        }
    }
}

/// Submission payload carried by a draft: the same shape as a not-yet-submitted
/// complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPayload {
    pub classification: Classification,
    pub location: Location,
    pub photo_ref: String,
    pub contact: Option<String>,
}

/// A complaint drafted while disconnected, queued on the client until synced.
///
/// `local_id` doubles as the submission-idempotency key and is never exposed
/// in the server-side id space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftComplaint {
    pub local_id: String,
    pub created_at_local: DateTime<Utc>,
    pub payload: DraftPayload,
    pub sync_state: SyncState,
}

impl DraftComplaint {
    pub fn new(local_id: impl Into<String>, created_at_local: DateTime<Utc>, payload: DraftPayload) -> Self {
        Self {
            local_id: local_id.into(),
            created_at_local,
            payload,
            sync_state: SyncState::Pending,
        }
    }
}
