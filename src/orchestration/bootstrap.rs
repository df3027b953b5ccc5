//! Assembly of the orchestration components around the collaborator seams.

use crate::config::CoreConfig;
use crate::events::publisher::EventPublisher;
use crate::orchestration::orchestrator::ComplaintOrchestrator;
use crate::orchestration::routing_engine::RoutingEngine;
use crate::registry::DepartmentRegistry;
use crate::services::{ComplaintStore, DepartmentEndpoint, NotificationService};
use crate::state_machine::ComplaintStateMachine;
use crate::sync::OfflineSyncReconciler;
use std::sync::Arc;

/// Fully wired orchestration core.
///
/// Owns the registry, state machine, routing engine, orchestrator, and
/// reconciler; the store, department endpoint, and notification channel are
/// supplied by the embedding host.
pub struct OrchestrationCore {
    pub config: CoreConfig,
    pub registry: Arc<DepartmentRegistry>,
    pub store: Arc<dyn ComplaintStore>,
    pub event_publisher: EventPublisher,
    pub state_machine: Arc<ComplaintStateMachine>,
    pub routing_engine: Arc<RoutingEngine>,
    pub orchestrator: Arc<ComplaintOrchestrator>,
    pub reconciler: OfflineSyncReconciler,
}

impl OrchestrationCore {
    pub fn new(
        config: CoreConfig,
        store: Arc<dyn ComplaintStore>,
        endpoint: Arc<dyn DepartmentEndpoint>,
        notifications: Arc<dyn NotificationService>,
    ) -> Self {
        let registry = Arc::new(DepartmentRegistry::new());
        let event_publisher = EventPublisher::new(config.event_channel_capacity);
        let state_machine = Arc::new(ComplaintStateMachine::new(
            store.clone(),
            event_publisher.clone(),
        ));
        let routing_engine = Arc::new(RoutingEngine::new(
            registry.clone(),
            endpoint,
            state_machine.clone(),
            notifications.clone(),
            event_publisher.clone(),
            &config,
        ));
        let orchestrator = Arc::new(ComplaintOrchestrator::new(
            store.clone(),
            state_machine.clone(),
            routing_engine.clone(),
            notifications,
            event_publisher.clone(),
            &config,
        ));
        let reconciler =
            OfflineSyncReconciler::new(orchestrator.clone(), event_publisher.clone());

        Self {
            config,
            registry,
            store,
            event_publisher,
            state_machine,
            routing_engine,
            orchestrator,
            reconciler,
        }
    }
}
