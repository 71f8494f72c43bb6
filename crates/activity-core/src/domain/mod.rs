//! # Activity Core - Domain Module
//! 
//! Domain entities for activity groups.

pub mod category;
pub mod activity_group;
pub mod schedule;
pub mod supervisor;
pub mod enrollment;
pub mod validation;

// Re-export all entities and enums
pub use category::Category;
pub use activity_group::{ActivityGroup, GroupDetails, GroupFilter};
pub use schedule::Schedule;
pub use supervisor::SupervisorAssignment;
pub use enrollment::{AttendanceStatus, Enrollment};
pub use validation::Validated;
