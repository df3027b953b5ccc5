//! Data model layer: the complaint aggregate root and its collaborators'
//! reference types.

pub mod complaint;
pub mod department;
pub mod draft_complaint;

pub use complaint::{
    Classification, ClassificationAlternative, Complaint, ComplaintType, Location, RoutingInfo,
    StatusHistoryEntry,
};
pub use department::Department;
pub use draft_complaint::{DraftComplaint, DraftPayload, SyncState};
