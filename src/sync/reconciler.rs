//! # Offline Sync Reconciler
//!
//! Replays a client's locally queued drafts against the submission pipeline in
//! strict creation order. Draft N+1 does not start until draft N has reached a
//! terminal per-draft outcome, even when individual submissions have wildly
//! different latency. Failed drafts are retained unchanged for the next
//! reconciliation pass, never dropped and never reordered.

use crate::constants::events as event_names;
use crate::events::publisher::EventPublisher;
use crate::logging::log_sync_operation;
use crate::models::{DraftComplaint, SyncState};
use crate::orchestration::orchestrator::ComplaintOrchestrator;
use crate::orchestration::types::{NewComplaint, SubmissionOutcome};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Terminal per-draft outcome of one reconciliation pass.
#[derive(Debug, Clone)]
pub enum DraftSyncOutcome {
    /// Draft accepted; the server-assigned id replaces the local one.
    Synced { local_id: String, complaint_id: Uuid },
    /// Draft already accepted in an earlier pass; original id returned.
    Duplicate { local_id: String, complaint_id: Uuid },
    /// Submission failed; draft retained locally for the next pass.
    Failed { local_id: String, error: String },
}

impl DraftSyncOutcome {
    pub fn local_id(&self) -> &str {
        match self {
            Self::Synced { local_id, .. }
            | Self::Duplicate { local_id, .. }
            | Self::Failed { local_id, .. } => local_id,
        }
    }

    /// The sync state the client storage collaborator should record.
    pub fn sync_state(&self) -> SyncState {
        match self {
            Self::Synced { .. } | Self::Duplicate { .. } => SyncState::Synced,
            Self::Failed { .. } => SyncState::Failed,
        }
    }

    pub fn complaint_id(&self) -> Option<Uuid> {
        match self {
            Self::Synced { complaint_id, .. } | Self::Duplicate { complaint_id, .. } => {
                Some(*complaint_id)
            }
            Self::Failed { .. } => None,
        }
    }
}

pub struct OfflineSyncReconciler {
    orchestrator: Arc<ComplaintOrchestrator>,
    event_publisher: EventPublisher,
}

impl OfflineSyncReconciler {
    pub fn new(orchestrator: Arc<ComplaintOrchestrator>, event_publisher: EventPublisher) -> Self {
        Self {
            orchestrator,
            event_publisher,
        }
    }

    /// Run one reconciliation pass over the queued drafts.
    ///
    /// Drafts are processed in ascending `created_at_local` order; each draft's
    /// `sync_state` is updated in place and the per-draft outcomes are returned
    /// in processing order. Removal of synced drafts from the client queue is
    /// the client storage collaborator's job.
    pub async fn reconcile(&self, drafts: &mut [DraftComplaint]) -> Vec<DraftSyncOutcome> {
        let mut order: Vec<usize> = (0..drafts.len()).collect();
        order.sort_by_key(|&i| drafts[i].created_at_local);

        let mut outcomes = Vec::with_capacity(drafts.len());
        for index in order {
            let draft = &mut drafts[index];
            // Drafts already synced in a previous pass are skipped by the
            // client; defend against being handed one anyway.
            if draft.sync_state == SyncState::Synced {
                continue;
            }
            draft.sync_state = SyncState::Syncing;

            let outcome = self.submit_draft(draft).await;
            draft.sync_state = outcome.sync_state();
            self.publish_outcome(&outcome).await;
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn submit_draft(&self, draft: &DraftComplaint) -> DraftSyncOutcome {
        let submission = NewComplaint {
            classification: draft.payload.classification.clone(),
            location: draft.payload.location.clone(),
            photo_ref: draft.payload.photo_ref.clone(),
            contact: draft.payload.contact.clone(),
            local_id: Some(draft.local_id.clone()),
        };

        match self.orchestrator.submit_with_outcome(submission).await {
            Ok(SubmissionOutcome::Created(complaint)) => {
                log_sync_operation(
                    "reconcile",
                    Some(&draft.local_id),
                    Some(complaint.id),
                    "synced",
                    None,
                );
                DraftSyncOutcome::Synced {
                    local_id: draft.local_id.clone(),
                    complaint_id: complaint.id,
                }
            }
            Ok(SubmissionOutcome::Duplicate(complaint)) => {
                log_sync_operation(
                    "reconcile",
                    Some(&draft.local_id),
                    Some(complaint.id),
                    "duplicate",
                    None,
                );
                DraftSyncOutcome::Duplicate {
                    local_id: draft.local_id.clone(),
                    complaint_id: complaint.id,
                }
            }
            Err(error) => {
                log_sync_operation(
                    "reconcile",
                    Some(&draft.local_id),
                    None,
                    "failed",
                    Some(&error.to_string()),
                );
                DraftSyncOutcome::Failed {
                    local_id: draft.local_id.clone(),
                    error: error.to_string(),
                }
            }
        }
    }

    async fn publish_outcome(&self, outcome: &DraftSyncOutcome) {
        let (event_name, context) = match outcome {
            DraftSyncOutcome::Synced {
                local_id,
                complaint_id,
            } => (
                event_names::SYNC_DRAFT_SYNCED,
                json!({"local_id": local_id, "complaint_id": complaint_id}),
            ),
            DraftSyncOutcome::Duplicate {
                local_id,
                complaint_id,
            } => (
                event_names::SYNC_DRAFT_DUPLICATE,
                json!({"local_id": local_id, "complaint_id": complaint_id}),
            ),
            DraftSyncOutcome::Failed { local_id, error } => (
                event_names::SYNC_DRAFT_FAILED,
                json!({"local_id": local_id, "error": error}),
            ),
        };
        if let Err(e) = self.event_publisher.publish(event_name, context).await {
            tracing::warn!(event_name = %event_name, error = %e, "Failed to publish sync event");
        }
    }
}
