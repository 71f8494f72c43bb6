//! Database module (PostgreSQL and in-memory adapters)

pub mod connection;
pub mod postgres;
pub mod memory;

pub use connection::{create_pool, run_migrations};
pub use postgres::{PgStaffDirectory, PgTransaction, PgUnitOfWork};
pub use memory::{MemoryStaffDirectory, MemoryStore, MemoryTransaction};
