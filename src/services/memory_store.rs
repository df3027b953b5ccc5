use super::{ComplaintFilter, ComplaintStore, StoreError};
use crate::models::Complaint;
use crate::state_machine::ComplaintState;
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

/// In-process complaint store.
///
/// Backs tests and embedded deployments; sharded map access means dashboard
/// reads never block lifecycle writes. A durable implementation plugs in
/// behind the same [`ComplaintStore`] trait.
#[derive(Debug, Default)]
pub struct InMemoryComplaintStore {
    complaints: DashMap<Uuid, Complaint>,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self {
            complaints: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.complaints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complaints.is_empty()
    }

    /// Complaints awaiting manual routing, oldest first.
    pub fn manual_routing_queue(&self) -> Vec<Complaint> {
        let mut queue: Vec<Complaint> = self
            .complaints
            .iter()
            .filter(|entry| entry.status == ComplaintState::PendingManualRouting)
            .map(|entry| entry.clone())
            .collect();
        queue.sort_by_key(|c| c.created_at);
        queue
    }
}

#[async_trait]
impl ComplaintStore for InMemoryComplaintStore {
    async fn insert(&self, complaint: Complaint) -> Result<(), StoreError> {
        // Id uniqueness holds across the full history of the system
        match self.complaints.entry(complaint.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::DuplicateId(complaint.id))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(complaint);
                Ok(())
            }
        }
    }

    async fn load(&self, complaint_id: Uuid) -> Result<Option<Complaint>, StoreError> {
        Ok(self.complaints.get(&complaint_id).map(|entry| entry.clone()))
    }

    async fn update(&self, complaint: Complaint) -> Result<(), StoreError> {
        match self.complaints.get_mut(&complaint.id) {
            Some(mut entry) => {
                *entry = complaint;
                Ok(())
            }
            None => Err(StoreError::WriteFailed(format!(
                "complaint {} does not exist",
                complaint.id
            ))),
        }
    }

    async fn query(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, StoreError> {
        let mut matching: Vec<Complaint> = self
            .complaints
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.clone())
            .collect();
        matching.sort_by_key(|c| c.created_at);
        Ok(matching)
    }
}
