//! Repository traits (ports)

pub mod category_repository;
pub mod group_repository;
pub mod schedule_repository;
pub mod supervisor_repository;
pub mod enrollment_repository;
pub mod staff_directory;
pub mod unit_of_work;

pub use category_repository::CategoryRepository;
pub use group_repository::GroupRepository;
pub use schedule_repository::ScheduleRepository;
pub use supervisor_repository::SupervisorRepository;
pub use enrollment_repository::EnrollmentRepository;
pub use staff_directory::StaffDirectory;
pub use unit_of_work::{Repositories, Transaction, UnitOfWork};

