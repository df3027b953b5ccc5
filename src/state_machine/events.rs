use serde::{Deserialize, Serialize};

/// Why a complaint was escalated to the manual-routing queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualRoutingReason {
    NoMapping,
    RoutingExhausted,
    Reclassification,
}

impl ManualRoutingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMapping => "no_mapping",
            Self::RoutingExhausted => "routing_exhausted",
            Self::Reclassification => "reclassification",
        }
    }
}

/// Events that can trigger complaint state transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ComplaintEvent {
    /// Route the complaint to a department with a created work order
    Assign {
        department_id: String,
        work_order_id: String,
    },
    /// Department has begun remediation work
    Start,
    /// Remediation is complete
    Resolve,
    /// Close the complaint without remediation
    Reject { reason: String },
    /// Escalate to the manual-routing queue; carries the prior work order id
    /// when a re-route supersedes an existing assignment
    QueueForManualRouting {
        reason: ManualRoutingReason,
        superseded_work_order: Option<String>,
    },
}

impl ComplaintEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Assign { .. } => "assign",
            Self::Start => "start",
            Self::Resolve => "resolve",
            Self::Reject { .. } => "reject",
            Self::QueueForManualRouting { .. } => "queue_for_manual_routing",
        }
    }

    /// Check if this event represents a terminal transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolve | Self::Reject { .. })
    }

    /// Create a rejection event with the given reason
    pub fn reject_with_reason(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let event = ComplaintEvent::Assign {
            department_id: "roads".to_string(),
            work_order_id: "wo-1".to_string(),
        };
        assert_eq!(event.event_type(), "assign");
        assert_eq!(ComplaintEvent::Start.event_type(), "start");
        assert_eq!(
            ComplaintEvent::reject_with_reason("spam").event_type(),
            "reject"
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(ComplaintEvent::Resolve.is_terminal());
        assert!(ComplaintEvent::reject_with_reason("dup").is_terminal());
        assert!(!ComplaintEvent::Start.is_terminal());
    }

    #[test]
    fn test_event_serde_tagging() {
        let event = ComplaintEvent::QueueForManualRouting {
            reason: ManualRoutingReason::NoMapping,
            superseded_work_order: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "QueueForManualRouting");
        assert_eq!(json["data"]["reason"], "no_mapping");
    }
}
