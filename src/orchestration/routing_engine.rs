//! # Routing Engine
//!
//! Resolves a department for a complaint, creates a work order against the
//! department's endpoint, retries on failure under the fixed-interval policy,
//! and escalates to the manual-routing queue on exhaustion or when no mapping
//! exists. The complaint is never dropped: every failure path leaves it
//! queryable with its full history.

use crate::config::CoreConfig;
use crate::constants::events as event_names;
use crate::error::Result;
use crate::events::publisher::EventPublisher;
use crate::logging::{log_error, log_routing_operation};
use crate::models::Complaint;
use crate::orchestration::types::{
    RoutingAttempt, RoutingFailure, RoutingResult, RoutingStatus,
};
use crate::registry::DepartmentRegistry;
use crate::resilience::{AttemptOutcome, DelayStrategy, RetryError, RetryPolicy, RetryScheduler};
use crate::services::{AdminAlert, DepartmentEndpoint, NotificationService};
use crate::state_machine::{ComplaintEvent, ComplaintState, ComplaintStateMachine, ManualRoutingReason};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct RoutingEngine {
    registry: Arc<DepartmentRegistry>,
    endpoint: Arc<dyn DepartmentEndpoint>,
    state_machine: Arc<ComplaintStateMachine>,
    notifications: Arc<dyn NotificationService>,
    event_publisher: EventPublisher,
    scheduler: RetryScheduler,
    policy: RetryPolicy,
    /// Complaints with a routing pass currently in flight
    in_flight: DashMap<Uuid, RoutingStatus>,
}

impl RoutingEngine {
    pub fn new(
        registry: Arc<DepartmentRegistry>,
        endpoint: Arc<dyn DepartmentEndpoint>,
        state_machine: Arc<ComplaintStateMachine>,
        notifications: Arc<dyn NotificationService>,
        event_publisher: EventPublisher,
        config: &CoreConfig,
    ) -> Self {
        let policy = RetryPolicy::fixed_interval()
            .with_max_attempts(config.routing_max_attempts)
            .with_delay(DelayStrategy::FixedInterval {
                delay: config.routing_retry_delay,
            })
            .with_attempt_timeout(config.routing_attempt_timeout);

        Self {
            registry,
            endpoint,
            state_machine,
            notifications,
            event_publisher,
            scheduler: RetryScheduler::new(),
            policy,
            in_flight: DashMap::new(),
        }
    }

    /// Routing status of a pass currently in flight, if any. A complaint
    /// between failed attempts reports `Queued` here while its stored status
    /// is still the pre-routing state.
    pub fn routing_status(&self, complaint_id: Uuid) -> Option<RoutingStatus> {
        self.in_flight.get(&complaint_id).map(|entry| *entry)
    }

    /// Run a full routing pass for the complaint.
    ///
    /// No per-complaint lock is held across the endpoint calls; status
    /// transitions go through the state machine after each outcome is known.
    pub async fn route(&self, complaint: &Complaint) -> Result<RoutingResult> {
        self.in_flight.insert(complaint.id, RoutingStatus::Queued);
        let result = self.route_inner(complaint).await;
        self.in_flight.remove(&complaint.id);
        result
    }

    async fn route_inner(&self, complaint: &Complaint) -> Result<RoutingResult> {
        let departments = self.registry.resolve(complaint.complaint_type);
        let Some(primary) = departments.first().cloned() else {
            log_routing_operation(
                "resolve",
                Some(complaint.id),
                None,
                None,
                "no_mapping",
                Some(&complaint.complaint_type.to_string()),
            );
            self.publish(
                event_names::ROUTING_NO_MAPPING,
                json!({
                    "complaint_id": complaint.id,
                    "complaint_type": complaint.complaint_type,
                }),
            )
            .await;
            return self
                .escalate(complaint, RoutingFailure::NoMapping, Vec::new())
                .await;
        };

        log_routing_operation(
            "route",
            Some(complaint.id),
            Some(&primary.id),
            None,
            "started",
            None,
        );

        let endpoint = self.endpoint.clone();
        let outcome = self
            .scheduler
            .execute("work_order_creation", &self.policy, |_| {
                let endpoint = endpoint.clone();
                let department = primary.clone();
                let complaint = complaint.clone();
                async move { endpoint.create_work_order(&department, &complaint).await }
            })
            .await;

        let attempts: Vec<RoutingAttempt> = outcome
            .attempts
            .iter()
            .map(|a| RoutingAttempt {
                complaint_id: complaint.id,
                attempt_number: a.attempt_number,
                scheduled_at: a.scheduled_at,
                outcome: a.outcome.clone(),
            })
            .collect();
        for attempt in attempts
            .iter()
            .filter(|a| a.outcome != AttemptOutcome::Succeeded)
        {
            self.publish(
                event_names::ROUTING_ATTEMPT_FAILED,
                json!({
                    "complaint_id": complaint.id,
                    "department_id": primary.id,
                    "attempt_number": attempt.attempt_number,
                }),
            )
            .await;
        }

        match outcome.result {
            Ok(work_order_id) => {
                self.state_machine
                    .transition(
                        complaint.id,
                        ComplaintEvent::Assign {
                            department_id: primary.id.clone(),
                            work_order_id: work_order_id.clone(),
                        },
                    )
                    .await?;
                log_routing_operation(
                    "route",
                    Some(complaint.id),
                    Some(&primary.id),
                    Some(attempts.len() as u32),
                    "routed",
                    Some(&work_order_id),
                );
                Ok(RoutingResult::routed(
                    primary.id.clone(),
                    work_order_id,
                    attempts,
                ))
            }
            Err(RetryError::Exhausted {
                attempts: attempt_count,
                ..
            }) => {
                self.publish(
                    event_names::ROUTING_EXHAUSTED,
                    json!({
                        "complaint_id": complaint.id,
                        "department_id": primary.id,
                        "attempts": attempt_count,
                    }),
                )
                .await;
                self.escalate(
                    complaint,
                    RoutingFailure::RoutingExhausted {
                        attempts: attempt_count,
                    },
                    attempts,
                )
                .await
            }
        }
    }

    /// Move the complaint to the manual-routing queue and alert
    /// administrators exactly once.
    async fn escalate(
        &self,
        complaint: &Complaint,
        failure: RoutingFailure,
        attempts: Vec<RoutingAttempt>,
    ) -> Result<RoutingResult> {
        let reason = match failure {
            RoutingFailure::NoMapping => ManualRoutingReason::NoMapping,
            RoutingFailure::RoutingExhausted { .. } => ManualRoutingReason::RoutingExhausted,
        };

        // A re-routed complaint is already in the queue; transitioning again
        // would fabricate a duplicate history entry.
        if complaint.status != ComplaintState::PendingManualRouting {
            self.state_machine
                .transition(
                    complaint.id,
                    ComplaintEvent::QueueForManualRouting {
                        reason,
                        superseded_work_order: None,
                    },
                )
                .await?;
        }

        if let Err(e) = self
            .notifications
            .notify_admins(AdminAlert {
                complaint_id: complaint.id,
                complaint_type: complaint.complaint_type,
                reason: failure.error_code().to_string(),
            })
            .await
        {
            log_error(
                "routing_engine",
                "notify_admins",
                &e.to_string(),
                Some(&complaint.id.to_string()),
            );
        }

        log_routing_operation(
            "escalate",
            Some(complaint.id),
            None,
            Some(attempts.len() as u32),
            "pending_manual_routing",
            Some(failure.error_code()),
        );

        Ok(RoutingResult::queued(failure, attempts))
    }

    async fn publish(&self, event_name: &str, context: serde_json::Value) {
        if let Err(e) = self.event_publisher.publish(event_name, context).await {
            tracing::warn!(event_name = %event_name, error = %e, "Failed to publish routing event");
        }
    }
}
