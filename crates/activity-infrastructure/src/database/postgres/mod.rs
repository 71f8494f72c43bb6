//! PostgreSQL repository implementations

mod executor;
pub mod unit_of_work;
pub mod category_repo_impl;
pub mod group_repo_impl;
pub mod schedule_repo_impl;
pub mod supervisor_repo_impl;
pub mod enrollment_repo_impl;
pub mod staff_directory_impl;

pub use unit_of_work::{PgRepositories, PgTransaction, PgUnitOfWork};
pub use category_repo_impl::PgCategoryRepository;
pub use group_repo_impl::PgGroupRepository;
pub use schedule_repo_impl::PgScheduleRepository;
pub use supervisor_repo_impl::PgSupervisorRepository;
pub use enrollment_repo_impl::PgEnrollmentRepository;
pub use staff_directory_impl::PgStaffDirectory;
