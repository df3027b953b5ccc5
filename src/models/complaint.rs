use crate::state_machine::ComplaintState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Fixed set of complaint categories produced by the classification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintType {
    Pothole,
    Garbage,
    Graffiti,
    BrokenStreetlight,
    DamagedSignage,
    IllegalDumping,
}

impl fmt::Display for ComplaintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pothole => write!(f, "pothole"),
            Self::Garbage => write!(f, "garbage"),
            Self::Graffiti => write!(f, "graffiti"),
            Self::BrokenStreetlight => write!(f, "broken_streetlight"),
            Self::DamagedSignage => write!(f, "damaged_signage"),
            Self::IllegalDumping => write!(f, "illegal_dumping"),
        }
    }
}

impl std::str::FromStr for ComplaintType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pothole" => Ok(Self::Pothole),
            "garbage" => Ok(Self::Garbage),
            "graffiti" => Ok(Self::Graffiti),
            "broken_streetlight" => Ok(Self::BrokenStreetlight),
            "damaged_signage" => Ok(Self::DamagedSignage),
            "illegal_dumping" => Ok(Self::IllegalDumping),
            _ => Err(format!("Invalid complaint type: {s}")),
        }
    }
}

/// Lower-ranked classification candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationAlternative {
    pub complaint_type: ComplaintType,
    pub confidence: f64,
}

/// Output of the classification collaborator, stored verbatim on the complaint.
///
/// Immutable once stored except by reclassification, which replaces the whole
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub complaint_type: ComplaintType,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Ordered by descending confidence.
    pub alternatives: Vec<ClassificationAlternative>,
    pub requires_manual_review: bool,
}

/// Output of the location collaborator. Immutable after acceptance; complaints
/// outside boundaries are rejected upstream and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub is_within_boundaries: bool,
}

/// One append-only record per accepted status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: ComplaintState,
    pub recorded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Routing outcome attached to a complaint once a work order exists.
///
/// Replaced (not appended) on reclassification-triggered re-routing; the prior
/// work order id is recorded in status-history metadata as superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub department_id: String,
    pub work_order_id: String,
    pub routed_at: DateTime<Utc>,
}

/// The complaint aggregate root.
///
/// `status` and `status_history` are written exclusively by the state machine;
/// other components read them and request transitions through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    /// Assigned once at first successful ingestion, never reassigned.
    pub id: Uuid,
    pub complaint_type: ComplaintType,
    pub classification: Classification,
    pub location: Location,
    /// Reference to the stored photo, produced by the upload collaborator.
    pub photo_ref: String,
    pub contact: Option<String>,
    pub status: ComplaintState,
    pub status_history: Vec<StatusHistoryEntry>,
    pub routing: Option<RoutingInfo>,
    /// Set by the confidence gate; visibility flag for the administrative
    /// review queue. Does not block routing.
    pub flagged_for_review: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Complaint {
    /// Create a complaint in `Submitted` state with its initial history entry.
    pub fn new(
        classification: Classification,
        location: Location,
        photo_ref: impl Into<String>,
        contact: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let flagged_for_review = classification.requires_manual_review;
        Self {
            id: Uuid::new_v4(),
            complaint_type: classification.complaint_type,
            classification,
            location,
            photo_ref: photo_ref.into(),
            contact,
            status: ComplaintState::Submitted,
            status_history: vec![StatusHistoryEntry {
                status: ComplaintState::Submitted,
                recorded_at: now,
                metadata: None,
            }],
            routing: None,
            flagged_for_review,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Latest history entry. History length is >= 1 by construction.
    pub fn last_history_entry(&self) -> &StatusHistoryEntry {
        self.status_history
            .last()
            .unwrap_or_else(|| unreachable!("status history is seeded at creation"))
    }
}
