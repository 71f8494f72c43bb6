//! # Activity Infrastructure
//! 
//! Store adapters for the activity engine: PostgreSQL and in-memory.

pub mod database;

pub use database::{
    create_pool, run_migrations, MemoryStaffDirectory, MemoryStore, PgStaffDirectory,
    PgUnitOfWork,
};
