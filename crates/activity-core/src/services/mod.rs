//! Domain services (business logic)

pub mod reconciliation;
pub mod primary_supervisor;
pub mod ownership;
pub mod activity_service;
mod activity_membership;

pub use reconciliation::{reconcile, Reconciliation};
pub use ownership::can_modify;
pub use activity_service::ActivityService;
