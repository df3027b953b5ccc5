//! Department registry: the complaint-type to department mapping consulted by
//! the routing engine.

pub mod department_registry;

pub use department_registry::{DepartmentRegistry, RegistrySnapshot};
