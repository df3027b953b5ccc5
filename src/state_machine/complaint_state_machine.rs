use super::errors::{StateMachineError, StateMachineResult};
use super::events::ComplaintEvent;
use super::states::ComplaintState;
use crate::constants::events as event_names;
use crate::events::publisher::EventPublisher;
use crate::logging::log_complaint_operation;
use crate::models::{Complaint, RoutingInfo, StatusHistoryEntry};
use crate::services::ComplaintStore;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Transition executor for the complaint lifecycle.
///
/// This is the only writer of `status`, `status_history`, `routing`, and
/// `resolved_at`. Transitions for the same complaint id are serialized on a
/// per-id lock; the lock covers only the load-validate-apply-persist sequence,
/// never a collaborator call.
pub struct ComplaintStateMachine {
    store: Arc<dyn ComplaintStore>,
    event_publisher: EventPublisher,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ComplaintStateMachine {
    pub fn new(store: Arc<dyn ComplaintStore>, event_publisher: EventPublisher) -> Self {
        Self {
            store,
            event_publisher,
            locks: DashMap::new(),
        }
    }

    /// Attempt to transition the complaint, appending exactly one history
    /// entry with a server-assigned timestamp on success.
    ///
    /// A rejected transition leaves the complaint and its history unchanged.
    pub async fn transition(
        &self,
        complaint_id: Uuid,
        event: ComplaintEvent,
    ) -> StateMachineResult<Complaint> {
        let lock = self.lock_for(complaint_id);

        let (from_state, updated) = {
            let _guard = lock.lock().await;

            let mut complaint = self.load(complaint_id).await?;
            let current_state = complaint.status;
            let target_state = Self::determine_target_state(current_state, &event)?;

            Self::apply(&mut complaint, target_state, &event);

            self.store.update(complaint.clone()).await.map_err(|e| {
                StateMachineError::PersistenceFailed {
                    reason: e.to_string(),
                }
            })?;

            (current_state, complaint)
        };

        log_complaint_operation(
            "transition",
            Some(complaint_id),
            Some(&updated.complaint_type.to_string()),
            &updated.status.to_string(),
            Some(event.event_type()),
        );
        self.publish_transition(&updated, from_state, &event).await;

        Ok(updated)
    }

    /// Get the current state of a complaint
    pub async fn current_state(&self, complaint_id: Uuid) -> StateMachineResult<ComplaintState> {
        Ok(self.load(complaint_id).await?.status)
    }

    /// Check if the complaint is in a terminal state
    pub async fn is_terminal(&self, complaint_id: Uuid) -> StateMachineResult<bool> {
        Ok(self.current_state(complaint_id).await?.is_terminal())
    }

    /// Determine the target state based on current state and event
    fn determine_target_state(
        current_state: ComplaintState,
        event: &ComplaintEvent,
    ) -> StateMachineResult<ComplaintState> {
        let target = match (current_state, event) {
            // Routing outcomes from intake
            (ComplaintState::Submitted, ComplaintEvent::Assign { .. }) => ComplaintState::Assigned,
            (ComplaintState::Submitted, ComplaintEvent::QueueForManualRouting { .. }) => {
                ComplaintState::PendingManualRouting
            }
            (ComplaintState::Submitted, ComplaintEvent::Reject { .. }) => ComplaintState::Rejected,

            // Department progress
            (ComplaintState::Assigned, ComplaintEvent::Start) => ComplaintState::InProgress,
            (ComplaintState::Assigned, ComplaintEvent::QueueForManualRouting { .. }) => {
                ComplaintState::PendingManualRouting
            }
            (ComplaintState::InProgress, ComplaintEvent::Resolve) => ComplaintState::Resolved,
            (ComplaintState::InProgress, ComplaintEvent::QueueForManualRouting { .. }) => {
                ComplaintState::PendingManualRouting
            }

            // Manual routing queue outcomes
            (ComplaintState::PendingManualRouting, ComplaintEvent::Assign { .. }) => {
                ComplaintState::Assigned
            }
            (ComplaintState::PendingManualRouting, ComplaintEvent::Reject { .. }) => {
                ComplaintState::Rejected
            }

            // Everything else, including any event against a terminal state
            (from_state, event) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from_state.to_string(),
                    to: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }

    /// Apply the accepted transition to the in-memory record
    fn apply(complaint: &mut Complaint, target_state: ComplaintState, event: &ComplaintEvent) {
        let now = Utc::now();

        let metadata = match event {
            ComplaintEvent::Assign {
                department_id,
                work_order_id,
            } => {
                complaint.routing = Some(RoutingInfo {
                    department_id: department_id.clone(),
                    work_order_id: work_order_id.clone(),
                    routed_at: now,
                });
                json!({
                    "event": event.event_type(),
                    "department_id": department_id,
                    "work_order_id": work_order_id,
                })
            }
            ComplaintEvent::QueueForManualRouting {
                reason,
                superseded_work_order,
            } => {
                // Prior routing info is retained so a pending complaint keeps
                // its last known route; the superseded work order is recorded
                // in history, never deleted.
                json!({
                    "event": event.event_type(),
                    "reason": reason.as_str(),
                    "superseded_work_order": superseded_work_order,
                })
            }
            ComplaintEvent::Reject { reason } => {
                // Rejection releases any routing info; the work order stays
                // visible in history, never deleted.
                let released = complaint.routing.take().map(|r| r.work_order_id);
                json!({
                    "event": event.event_type(),
                    "reason": reason,
                    "released_work_order": released,
                })
            }
            ComplaintEvent::Start | ComplaintEvent::Resolve => json!({
                "event": event.event_type(),
            }),
        };

        complaint.status = target_state;
        complaint.status_history.push(StatusHistoryEntry {
            status: target_state,
            recorded_at: now,
            metadata: Some(metadata),
        });
        complaint.updated_at = now;
        if target_state == ComplaintState::Resolved {
            complaint.resolved_at = Some(now);
        }
    }

    /// Publish the lifecycle event for an accepted transition
    async fn publish_transition(
        &self,
        complaint: &Complaint,
        from_state: ComplaintState,
        event: &ComplaintEvent,
    ) {
        let event_name = match complaint.status {
            ComplaintState::Submitted => event_names::COMPLAINT_SUBMITTED,
            ComplaintState::Assigned => event_names::COMPLAINT_ASSIGNED,
            ComplaintState::InProgress => event_names::COMPLAINT_IN_PROGRESS,
            ComplaintState::Resolved => event_names::COMPLAINT_RESOLVED,
            ComplaintState::Rejected => event_names::COMPLAINT_REJECTED,
            ComplaintState::PendingManualRouting => {
                event_names::COMPLAINT_PENDING_MANUAL_ROUTING
            }
        };

        let context = json!({
            "complaint_id": complaint.id,
            "complaint_type": complaint.complaint_type,
            "from": from_state,
            "to": complaint.status,
            "event": event.event_type(),
        });

        if let Err(e) = self.event_publisher.publish(event_name, context).await {
            tracing::warn!(
                complaint_id = %complaint.id,
                event_name = %event_name,
                error = %e,
                "Failed to publish lifecycle event"
            );
        }
    }

    async fn load(&self, complaint_id: Uuid) -> StateMachineResult<Complaint> {
        self.store
            .load(complaint_id)
            .await
            .map_err(|e| StateMachineError::PersistenceFailed {
                reason: e.to_string(),
            })?
            .ok_or(StateMachineError::ComplaintNotFound { complaint_id })
    }

    /// Per-complaint record lock, shared with the orchestrator for the one
    /// non-status record mutation it owns (classification replacement), so a
    /// load-modify-write there cannot clobber a concurrent transition.
    pub(crate) fn record_lock(&self, complaint_id: Uuid) -> Arc<Mutex<()>> {
        self.lock_for(complaint_id)
    }

    fn lock_for(&self, complaint_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(complaint_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
