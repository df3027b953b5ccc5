//! # Complaint Orchestrator
//!
//! Top-level coordinator for the submission pipeline: boundary validation,
//! idempotent ingestion, confidence gating, routing, and lifecycle event
//! emission. Also hosts the reclassification and administrative entry points.

use crate::config::CoreConfig;
use crate::constants::{events as event_names, NotificationKind};
use crate::error::{CoreError, Result};
use crate::events::publisher::EventPublisher;
use crate::logging::{log_complaint_operation, log_error};
use crate::models::{Classification, ClassificationAlternative, Complaint, ComplaintType};
use crate::orchestration::routing_engine::RoutingEngine;
use crate::orchestration::types::{NewComplaint, SubmissionOutcome};
use crate::resilience::{DelayStrategy, RetryPolicy, RetryScheduler};
use crate::services::{ComplaintStore, NotificationRequest, NotificationService};
use crate::state_machine::{
    ComplaintEvent, ComplaintState, ComplaintStateMachine, ManualRoutingReason,
};
use crate::sync::IdempotencyLedger;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct ComplaintOrchestrator {
    store: Arc<dyn ComplaintStore>,
    state_machine: Arc<ComplaintStateMachine>,
    routing_engine: Arc<RoutingEngine>,
    notifications: Arc<dyn NotificationService>,
    event_publisher: EventPublisher,
    scheduler: RetryScheduler,
    persistence_policy: RetryPolicy,
    dedup: IdempotencyLedger,
}

impl ComplaintOrchestrator {
    pub fn new(
        store: Arc<dyn ComplaintStore>,
        state_machine: Arc<ComplaintStateMachine>,
        routing_engine: Arc<RoutingEngine>,
        notifications: Arc<dyn NotificationService>,
        event_publisher: EventPublisher,
        config: &CoreConfig,
    ) -> Self {
        let persistence_policy = RetryPolicy::exponential()
            .with_max_attempts(config.persistence_max_attempts)
            .with_delay(DelayStrategy::Exponential {
                base: config.persistence_backoff_base,
                factor: config.persistence_backoff_factor,
            });

        Self {
            store,
            state_machine,
            routing_engine,
            notifications,
            event_publisher,
            scheduler: RetryScheduler::new(),
            persistence_policy,
            dedup: IdempotencyLedger::new(config.dedup_retention),
        }
    }

    /// Submit a classified, geolocated complaint through the full pipeline.
    ///
    /// A repeated `local_id` inside the dedup window returns the original
    /// complaint rather than creating a second one.
    pub async fn submit(&self, new: NewComplaint) -> Result<Complaint> {
        self.submit_with_outcome(new)
            .await
            .map(SubmissionOutcome::into_complaint)
    }

    /// Submission variant that reports whether the result was deduplicated;
    /// used by the offline sync reconciler.
    pub async fn submit_with_outcome(&self, new: NewComplaint) -> Result<SubmissionOutcome> {
        // Boundary rejection creates no record at all
        if !new.location.is_within_boundaries {
            return Err(CoreError::OutOfBoundary);
        }

        if let Some(local_id) = &new.local_id {
            if let Some(original_id) = self.dedup.lookup(local_id) {
                let original = self.load_required(original_id).await?;
                tracing::info!(
                    local_id = %local_id,
                    complaint_id = %original_id,
                    "Duplicate submission resolved to original complaint"
                );
                return Ok(SubmissionOutcome::Duplicate(original));
            }
        }

        let complaint = Complaint::new(
            new.classification,
            new.location,
            new.photo_ref,
            new.contact,
        );

        let store = self.store.clone();
        let to_insert = complaint.clone();
        let insert = self
            .scheduler
            .execute("complaint_insert", &self.persistence_policy, move |_| {
                let store = store.clone();
                let complaint = to_insert.clone();
                async move { store.insert(complaint).await }
            })
            .await;
        if let Err(e) = insert.result {
            return Err(CoreError::Persistence(e.to_string()));
        }

        if let Some(local_id) = &new.local_id {
            self.dedup.record(local_id.clone(), complaint.id);
        }

        log_complaint_operation(
            "submit",
            Some(complaint.id),
            Some(&complaint.complaint_type.to_string()),
            "submitted",
            complaint
                .flagged_for_review
                .then_some("flagged_for_review"),
        );
        // Event emission and confirmation delivery are independent of each
        // other; neither can fail the submission
        futures::join!(
            self.publish(
                event_names::COMPLAINT_SUBMITTED,
                json!({
                    "complaint_id": complaint.id,
                    "complaint_type": complaint.complaint_type,
                    "flagged_for_review": complaint.flagged_for_review,
                }),
            ),
            self.dispatch_notification(&complaint, NotificationKind::Confirmation),
        );

        // The review flag never blocks routing
        self.routing_engine.route(&complaint).await?;

        let updated = self.load_required(complaint.id).await?;
        if matches!(
            updated.status,
            ComplaintState::Assigned | ComplaintState::PendingManualRouting
        ) {
            self.dispatch_notification(&updated, NotificationKind::StatusUpdate)
                .await;
        }

        Ok(SubmissionOutcome::Created(updated))
    }

    /// Administrative reclassification: replaces the classification, records
    /// the prior work order as superseded, and re-runs routing for the new
    /// type.
    pub async fn reclassify(
        &self,
        complaint_id: Uuid,
        new_type: ComplaintType,
    ) -> Result<Complaint> {
        let complaint = self.load_required(complaint_id).await?;
        if complaint.is_terminal() {
            return Err(CoreError::InvalidTransition {
                from: complaint.status.to_string(),
                to: "reclassified".to_string(),
            });
        }

        let previous_type = complaint.complaint_type;
        let superseded = complaint
            .routing
            .as_ref()
            .map(|r| r.work_order_id.clone());

        // Replace the classification under the per-complaint record lock so
        // this load-modify-write cannot clobber a concurrent transition. Each
        // retry attempt re-acquires the lock around the in-memory write only.
        let store = self.store.clone();
        let state_machine = self.state_machine.clone();
        let update = self
            .scheduler
            .execute(
                "classification_update",
                &self.persistence_policy,
                move |_| {
                    let store = store.clone();
                    let state_machine = state_machine.clone();
                    async move {
                        let lock = state_machine.record_lock(complaint_id);
                        let _guard = lock.lock().await;
                        let mut current = store
                            .load(complaint_id)
                            .await
                            .map_err(|e| e.to_string())?
                            .ok_or_else(|| format!("complaint {complaint_id} not found"))?;
                        current.classification =
                            reclassified(&current.classification, new_type);
                        current.complaint_type = new_type;
                        current.updated_at = Utc::now();
                        store.update(current).await.map_err(|e| e.to_string())
                    }
                },
            )
            .await;
        if let Err(e) = update.result {
            return Err(CoreError::Persistence(e.to_string()));
        }

        // Send the complaint back through routing, recording the prior work
        // order as superseded in history metadata
        let queued = if complaint.status != ComplaintState::PendingManualRouting {
            self.state_machine
                .transition(
                    complaint_id,
                    ComplaintEvent::QueueForManualRouting {
                        reason: ManualRoutingReason::Reclassification,
                        superseded_work_order: superseded.clone(),
                    },
                )
                .await?
        } else {
            self.load_required(complaint_id).await?
        };

        log_complaint_operation(
            "reclassify",
            Some(complaint_id),
            Some(&new_type.to_string()),
            &queued.status.to_string(),
            Some(&previous_type.to_string()),
        );
        self.publish(
            event_names::COMPLAINT_RECLASSIFIED,
            json!({
                "complaint_id": complaint_id,
                "previous_type": previous_type,
                "new_type": new_type,
                "superseded_work_order": superseded,
            }),
        )
        .await;

        self.routing_engine.route(&queued).await?;

        let updated = self.load_required(complaint_id).await?;
        self.dispatch_notification(&updated, NotificationKind::StatusUpdate)
            .await;
        Ok(updated)
    }

    /// Administrative closure without remediation, including complaints stuck
    /// in the manual-routing queue.
    pub async fn reject(&self, complaint_id: Uuid, reason: impl Into<String>) -> Result<Complaint> {
        let updated = self
            .state_machine
            .transition(complaint_id, ComplaintEvent::reject_with_reason(reason))
            .await?;
        self.dispatch_notification(&updated, NotificationKind::StatusUpdate)
            .await;
        Ok(updated)
    }

    /// Department progress update: remediation work has begun.
    pub async fn start_work(&self, complaint_id: Uuid) -> Result<Complaint> {
        let updated = self
            .state_machine
            .transition(complaint_id, ComplaintEvent::Start)
            .await?;
        self.dispatch_notification(&updated, NotificationKind::StatusUpdate)
            .await;
        Ok(updated)
    }

    /// Department progress update: remediation complete.
    pub async fn resolve(&self, complaint_id: Uuid) -> Result<Complaint> {
        let updated = self
            .state_machine
            .transition(complaint_id, ComplaintEvent::Resolve)
            .await?;
        self.dispatch_notification(&updated, NotificationKind::Resolution)
            .await;
        Ok(updated)
    }

    async fn load_required(&self, complaint_id: Uuid) -> Result<Complaint> {
        self.store
            .load(complaint_id)
            .await
            .map_err(|e| CoreError::Persistence(e.to_string()))?
            .ok_or(CoreError::ComplaintNotFound { complaint_id })
    }

    /// Delivery outcomes are logged; a failed notification never blocks or
    /// reverses a transition.
    async fn dispatch_notification(&self, complaint: &Complaint, kind: NotificationKind) {
        let request = NotificationRequest {
            complaint_id: complaint.id,
            kind,
            contact: complaint.contact.clone(),
        };
        if let Err(e) = self.notifications.notify(request).await {
            log_error(
                "orchestrator",
                "notify",
                &e.to_string(),
                Some(&complaint.id.to_string()),
            );
        }
    }

    async fn publish(&self, event_name: &str, context: serde_json::Value) {
        if let Err(e) = self.event_publisher.publish(event_name, context).await {
            tracing::warn!(event_name = %event_name, error = %e, "Failed to publish lifecycle event");
        }
    }
}

/// Derive the replacement classification for an administrative type change.
///
/// The prior type moves to the head of the alternatives; the review flag is
/// about classification confidence, not type-correctness, so it carries over
/// unchanged.
fn reclassified(prior: &Classification, new_type: ComplaintType) -> Classification {
    let mut alternatives: Vec<ClassificationAlternative> =
        Vec::with_capacity(prior.alternatives.len() + 1);
    if prior.complaint_type != new_type {
        alternatives.push(ClassificationAlternative {
            complaint_type: prior.complaint_type,
            confidence: prior.confidence,
        });
    }
    alternatives.extend(
        prior
            .alternatives
            .iter()
            .filter(|a| a.complaint_type != new_type)
            .cloned(),
    );

    let confidence = prior
        .alternatives
        .iter()
        .find(|a| a.complaint_type == new_type)
        .map(|a| a.confidence)
        .unwrap_or(prior.confidence);

    Classification {
        complaint_type: new_type,
        confidence,
        alternatives,
        requires_manual_review: prior.requires_manual_review,
    }
}
