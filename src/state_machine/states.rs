use serde::{Deserialize, Serialize};
use std::fmt;

/// Complaint lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintState {
    /// Initial state recorded at ingestion
    Submitted,
    /// Routed to a department with a created work order
    Assigned,
    /// Department has started remediation work
    InProgress,
    /// Remediation complete
    Resolved,
    /// Closed without remediation
    Rejected,
    /// Escalated to the manual-routing queue (no mapping or routing exhausted)
    PendingManualRouting,
}

impl ComplaintState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }

    /// Check if this state requires routing information to be present
    pub fn requires_routing(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress | Self::Resolved)
    }

    /// Allowed transition targets from this state
    pub fn allowed_targets(&self) -> &'static [ComplaintState] {
        match self {
            Self::Submitted => &[
                Self::Assigned,
                Self::PendingManualRouting,
                Self::Rejected,
            ],
            Self::Assigned => &[Self::InProgress, Self::PendingManualRouting],
            Self::InProgress => &[Self::Resolved, Self::PendingManualRouting],
            Self::PendingManualRouting => &[Self::Assigned, Self::Rejected],
            Self::Resolved | Self::Rejected => &[],
        }
    }

    /// Check whether a direct transition to `target` is in the table
    pub fn can_transition_to(&self, target: ComplaintState) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl fmt::Display for ComplaintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Assigned => write!(f, "assigned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Rejected => write!(f, "rejected"),
            Self::PendingManualRouting => write!(f, "pending_manual_routing"),
        }
    }
}

impl std::str::FromStr for ComplaintState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            "pending_manual_routing" => Ok(Self::PendingManualRouting),
            _ => Err(format!("Invalid complaint state: {s}")),
        }
    }
}

impl Default for ComplaintState {
    fn default() -> Self {
        Self::Submitted
    }
}
