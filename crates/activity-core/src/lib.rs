//! # Activity Core
//! 
//! Domain entities, repository traits, and the services that keep an activity
//! group's supervisors, schedules, and enrollments consistent.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, EntityKind, ErrorKind};
