use serde::{Deserialize, Serialize};

/// A municipal department capable of servicing one or more complaint types.
///
/// Owned by the department registry; routing results reference departments by
/// id and resolve them at read time rather than embedding a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    /// Opaque reference to the department's work-order endpoint.
    pub endpoint_ref: String,
    pub is_primary: bool,
    /// Lower value means higher priority.
    pub priority: i32,
}

impl Department {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoint_ref: impl Into<String>,
        is_primary: bool,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint_ref: endpoint_ref.into(),
            is_primary,
            priority,
        }
    }
}
