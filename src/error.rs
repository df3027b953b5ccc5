use uuid::Uuid;

/// Top-level error taxonomy for the complaint orchestration core.
///
/// Validation errors (`OutOfBoundary`, `InvalidTransition`) are rejected
/// synchronously and mutate nothing. Transient infrastructure failures are
/// retried by the owning component and surface here only after exhaustion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// Complaint location falls outside municipal boundaries; no record is created.
    #[error("complaint location is outside municipal boundaries")]
    OutOfBoundary,

    /// No department is configured for the complaint type.
    #[error("no department mapping configured for complaint type '{complaint_type}'")]
    NoMapping { complaint_type: String },

    /// Requested status transition is not in the allowed transition table.
    #[error("invalid transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    /// Work-order creation failed on every allowed attempt.
    #[error("routing exhausted after {attempts} attempts")]
    RoutingExhausted { attempts: u32 },

    /// A draft with this local id was already accepted inside the dedup window.
    /// Callers receive the original complaint, not this error; it exists so the
    /// collision is observable in logs and outcomes.
    #[error("duplicate submission for local id '{local_id}'")]
    DuplicateSubmission { local_id: String },

    #[error("complaint {complaint_id} not found")]
    ComplaintNotFound { complaint_id: Uuid },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
