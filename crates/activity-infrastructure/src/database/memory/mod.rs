//! In-process store with the same transactional contract as PostgreSQL.
//!
//! Used by the engine tests and by embedders that do not need durability.
//! Writers are serialized through one gate; a transaction works on a private
//! copy of the tables and publishes it on commit.

mod state;
mod repositories;
mod store;
mod staff;

pub use repositories::{
    MemoryCategoryRepository, MemoryEnrollmentRepository, MemoryGroupRepository,
    MemoryRepositories, MemoryScheduleRepository, MemorySupervisorRepository,
};
pub use staff::MemoryStaffDirectory;
pub use store::{MemoryStore, MemoryTransaction};
