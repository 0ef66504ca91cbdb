//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - HTTP implementations of the backend collaborators
//! - Tokio runtime bridge for async operations

pub mod api;
pub mod runtime;

pub use api::{AuthService, Collaborators, GroupSource, HttpBackend, StatsSource};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
