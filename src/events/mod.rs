//! Lifecycle event system: broadcast publication of complaint transitions for
//! the notification collaborator and any other subscriber.

pub mod publisher;

pub use publisher::{EventPublisher, PublishError, PublishedEvent};
