//! # Complaint Orchestration
//!
//! The coordination layer: routing engine, top-level orchestrator, and the
//! wiring that assembles them around a store, a department endpoint, and a
//! notification channel.

pub mod bootstrap;
pub mod orchestrator;
pub mod routing_engine;
pub mod types;

pub use bootstrap::OrchestrationCore;
pub use orchestrator::ComplaintOrchestrator;
pub use routing_engine::RoutingEngine;
pub use types::{
    NewComplaint, RoutingAttempt, RoutingFailure, RoutingResult, RoutingStatus, SubmissionOutcome,
};
