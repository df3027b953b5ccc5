// State machine module for complaint lifecycle management
//
// Owns the canonical status of every complaint and its append-only history.
// All status mutation flows through ComplaintStateMachine; transitions for a
// single complaint are serialized on a per-id lock.

pub mod complaint_state_machine;
pub mod errors;
pub mod events;
pub mod states;

// Re-export main types for convenient access
pub use complaint_state_machine::ComplaintStateMachine;
pub use errors::{StateMachineError, StateMachineResult};
pub use events::{ComplaintEvent, ManualRoutingReason};
pub use states::ComplaintState;
