//! # Department Registry
//!
//! Read-mostly mapping from complaint type to the departments that can service
//! it. Readers grab an immutable snapshot behind an `Arc`; writers build a new
//! snapshot and swap it atomically, so a reader sees either the old or the new
//! mapping, never a mix.

use crate::models::{ComplaintType, Department};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable view of the full mapping at a point in time.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    pub version: u64,
    mappings: HashMap<ComplaintType, Vec<Department>>,
}

impl RegistrySnapshot {
    /// Departments for the given type, primary first then ascending priority.
    ///
    /// When the stored configuration flags more than one department as
    /// primary, the lowest-priority-value entry deterministically wins and a
    /// configuration warning is logged; the lookup never fails. An unmapped
    /// type yields an empty list, distinct from a transient failure.
    pub fn resolve(&self, complaint_type: ComplaintType) -> Vec<Department> {
        let Some(departments) = self.mappings.get(&complaint_type) else {
            return Vec::new();
        };

        let primaries: Vec<&Department> =
            departments.iter().filter(|d| d.is_primary).collect();
        if primaries.len() > 1 {
            warn!(
                complaint_type = %complaint_type,
                primary_count = primaries.len(),
                "Multiple primary departments configured; treating lowest priority value as primary"
            );
        }
        let primary_id = primaries
            .iter()
            .min_by_key(|d| (d.priority, d.id.clone()))
            .map(|d| d.id.clone());

        let mut ordered = departments.clone();
        ordered.sort_by(|a, b| {
            let a_primary = Some(&a.id) == primary_id.as_ref();
            let b_primary = Some(&b.id) == primary_id.as_ref();
            b_primary
                .cmp(&a_primary)
                .then(a.priority.cmp(&b.priority))
                .then(a.id.cmp(&b.id))
        });
        ordered
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Registry of department mappings with atomic snapshot swapping.
pub struct DepartmentRegistry {
    snapshot: RwLock<Arc<RegistrySnapshot>>,
}

impl DepartmentRegistry {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(RegistrySnapshot::default())),
        }
    }

    /// Current snapshot; cheap to clone, safe to hold across await points.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.read().clone()
    }

    /// Resolve the ordered department list for a complaint type.
    pub fn resolve(&self, complaint_type: ComplaintType) -> Vec<Department> {
        self.snapshot().resolve(complaint_type)
    }

    /// Insert or replace (matched by department id) a department mapping for
    /// the given complaint type. Builds a new snapshot and swaps it in.
    pub fn upsert(&self, complaint_type: ComplaintType, department: Department) {
        let mut guard = self.snapshot.write();
        let mut mappings = guard.mappings.clone();
        let departments = mappings.entry(complaint_type).or_default();
        if let Some(existing) = departments.iter_mut().find(|d| d.id == department.id) {
            *existing = department.clone();
        } else {
            departments.push(department.clone());
        }
        departments.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));

        let version = guard.version + 1;
        debug!(
            complaint_type = %complaint_type,
            department_id = %department.id,
            version = version,
            "Department mapping updated"
        );
        *guard = Arc::new(RegistrySnapshot { version, mappings });
    }

    /// All configured mappings, per complaint type.
    pub fn list_all(&self) -> Vec<(ComplaintType, Vec<Department>)> {
        let snapshot = self.snapshot();
        let mut all: Vec<(ComplaintType, Vec<Department>)> = snapshot
            .mappings
            .keys()
            .map(|t| (*t, snapshot.resolve(*t)))
            .collect();
        all.sort_by_key(|(t, _)| t.to_string());
        all
    }
}

impl Default for DepartmentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
