#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Complaint Core
//!
//! Orchestration core for a municipal complaint-reporting system: takes a
//! classified, geolocated complaint and drives it through department routing,
//! status transitions, retry/backoff on downstream failure, and reconciliation
//! of offline-originated submissions.
//!
//! ## Architecture
//!
//! The pipeline runs classified+located complaint → orchestrator → routing
//! engine → department registry lookup → work-order creation (retried on
//! failure) → state machine transition → lifecycle event. The offline sync
//! reconciler feeds the same entry point once per queued draft, in order.
//!
//! The core stays correct under partial failure of downstream systems: routing
//! retries on a fixed five-minute interval and escalates to the manual-routing
//! queue on exhaustion, persistence writes back off exponentially, and a
//! failed collaborator never corrupts a complaint's recorded history.
//!
//! ## Module Organization
//!
//! - [`models`] - Complaint aggregate, departments, offline drafts
//! - [`state_machine`] - Canonical status ownership and transition validation
//! - [`registry`] - Complaint-type to department mapping with snapshot swaps
//! - [`resilience`] - Generic bounded-retry scheduler and the two named policies
//! - [`orchestration`] - Routing engine and top-level orchestrator
//! - [`sync`] - FIFO offline draft reconciliation and the idempotency ledger
//! - [`services`] - Collaborator trait seams (endpoint, notifications, store)
//! - [`events`] - Lifecycle event publication
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use complaint_core::config::CoreConfig;
//! use complaint_core::models::Department;
//! use complaint_core::models::ComplaintType;
//! use complaint_core::orchestration::OrchestrationCore;
//! use complaint_core::services::InMemoryComplaintStore;
//! use std::sync::Arc;
//!
//! # use complaint_core::services::{DepartmentEndpoint, NotificationService};
//! # fn example(endpoint: Arc<dyn DepartmentEndpoint>, notifications: Arc<dyn NotificationService>) {
//! let store = Arc::new(InMemoryComplaintStore::new());
//! let core = OrchestrationCore::new(CoreConfig::default(), store, endpoint, notifications);
//!
//! core.registry.upsert(
//!     ComplaintType::Pothole,
//!     Department::new("roads", "Roads", "endpoint://roads", true, 1),
//! );
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod registry;
pub mod resilience;
pub mod services;
pub mod state_machine;
pub mod sync;

pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use models::{Complaint, ComplaintType, Department, DraftComplaint};
pub use orchestration::{
    ComplaintOrchestrator, NewComplaint, OrchestrationCore, RoutingResult, RoutingStatus,
};
pub use registry::DepartmentRegistry;
pub use state_machine::{ComplaintState, ComplaintStateMachine};
pub use sync::{DraftSyncOutcome, OfflineSyncReconciler};
