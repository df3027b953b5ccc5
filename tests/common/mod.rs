//! Shared test doubles and fixtures for the integration suite.

#![allow(dead_code)]

use async_trait::async_trait;
use complaint_core::config::CoreConfig;
use complaint_core::models::{Classification, Complaint, ComplaintType, Department, Location};
use complaint_core::orchestration::{NewComplaint, OrchestrationCore};
use complaint_core::services::{
    AdminAlert, DepartmentEndpoint, EndpointError, InMemoryComplaintStore, NotificationError,
    NotificationRequest, NotificationService,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Department endpoint double with scripted failures and latency.
pub struct ScriptedEndpoint {
    fail_first: u32,
    /// Per-call latency, consumed front to back; the last entry repeats.
    call_delays: Mutex<Vec<Duration>>,
    calls: AtomicU32,
    created: Mutex<Vec<(String, String)>>,
}

impl ScriptedEndpoint {
    pub fn succeeding() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(fail_first: u32) -> Self {
        Self {
            fail_first,
            call_delays: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    pub fn with_call_delays(mut self, delays: Vec<Duration>) -> Self {
        self.call_delays = Mutex::new(delays);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// (department_id, work_order_id) pairs in creation order.
    pub fn created_work_orders(&self) -> Vec<(String, String)> {
        self.created.lock().clone()
    }
}

#[async_trait]
impl DepartmentEndpoint for ScriptedEndpoint {
    async fn create_work_order(
        &self,
        department: &Department,
        _complaint: &Complaint,
    ) -> Result<String, EndpointError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = {
            let mut delays = self.call_delays.lock();
            if delays.len() > 1 {
                Some(delays.remove(0))
            } else {
                delays.first().copied()
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if call <= self.fail_first {
            return Err(EndpointError::Unavailable("scripted outage".to_string()));
        }

        let work_order_id = format!("wo-{call}");
        self.created
            .lock()
            .push((department.id.clone(), work_order_id.clone()));
        Ok(work_order_id)
    }
}

/// Notification double that records every delivery request.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<NotificationRequest>>,
    pub admin_alerts: Mutex<Vec<AdminAlert>>,
    pub fail_deliveries: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_deliveries: true,
            ..Self::default()
        }
    }

    pub fn admin_alert_count(&self) -> usize {
        self.admin_alerts.lock().len()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        if self.fail_deliveries {
            return Err(NotificationError::DeliveryFailed("scripted".to_string()));
        }
        self.notifications.lock().push(request);
        Ok(())
    }

    async fn notify_admins(&self, alert: AdminAlert) -> Result<(), NotificationError> {
        self.admin_alerts.lock().push(alert);
        Ok(())
    }
}

pub struct TestCore {
    pub core: OrchestrationCore,
    pub store: Arc<InMemoryComplaintStore>,
    pub endpoint: Arc<ScriptedEndpoint>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build a core with fast retry timing so paused-clock tests stay readable.
pub fn build_core(endpoint: ScriptedEndpoint) -> TestCore {
    build_core_with(CoreConfig::default(), endpoint)
}

pub fn build_core_with(config: CoreConfig, endpoint: ScriptedEndpoint) -> TestCore {
    let store = Arc::new(InMemoryComplaintStore::new());
    let endpoint = Arc::new(endpoint);
    let notifier = Arc::new(RecordingNotifier::new());
    let core = OrchestrationCore::new(
        config,
        store.clone(),
        endpoint.clone(),
        notifier.clone(),
    );
    TestCore {
        core,
        store,
        endpoint,
        notifier,
    }
}

/// Roads is primary with priority 1, Sanitation secondary with priority 2.
pub fn register_roads_and_sanitation(core: &OrchestrationCore, complaint_type: ComplaintType) {
    core.registry.upsert(
        complaint_type,
        Department::new("roads", "Roads", "endpoint://roads", true, 1),
    );
    core.registry.upsert(
        complaint_type,
        Department::new("sanitation", "Sanitation", "endpoint://sanitation", false, 2),
    );
}

pub fn classification(complaint_type: ComplaintType, confidence: f64) -> Classification {
    Classification {
        complaint_type,
        confidence,
        alternatives: vec![],
        requires_manual_review: confidence < 0.6,
    }
}

pub fn in_bounds_location() -> Location {
    Location {
        latitude: 47.6062,
        longitude: -122.3321,
        address: "600 4th Ave".to_string(),
        is_within_boundaries: true,
    }
}

pub fn out_of_bounds_location() -> Location {
    Location {
        latitude: 48.0,
        longitude: -121.0,
        address: "outside city limits".to_string(),
        is_within_boundaries: false,
    }
}

pub fn new_complaint(complaint_type: ComplaintType) -> NewComplaint {
    NewComplaint {
        classification: classification(complaint_type, 0.92),
        location: in_bounds_location(),
        photo_ref: "photos/test.jpg".to_string(),
        contact: Some("reporter@example.com".to_string()),
        local_id: None,
    }
}
