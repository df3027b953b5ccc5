use uuid::Uuid;

/// Errors surfaced by the complaint state machine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateMachineError {
    /// Requested transition is not in the allowed table; the complaint and its
    /// history are unchanged.
    #[error("invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("complaint {complaint_id} not found")]
    ComplaintNotFound { complaint_id: Uuid },

    #[error("failed to persist transition: {reason}")]
    PersistenceFailed { reason: String },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

impl From<StateMachineError> for crate::error::CoreError {
    fn from(err: StateMachineError) -> Self {
        match err {
            StateMachineError::InvalidTransition { from, to } => {
                crate::error::CoreError::InvalidTransition { from, to }
            }
            StateMachineError::ComplaintNotFound { complaint_id } => {
                crate::error::CoreError::ComplaintNotFound { complaint_id }
            }
            StateMachineError::PersistenceFailed { reason } => {
                crate::error::CoreError::Persistence(reason)
            }
        }
    }
}
