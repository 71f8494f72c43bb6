//! Unit of work (port)
//!
//! A [`UnitOfWork`] exposes repositories bound to the shared pool and opens
//! [`Transaction`]s whose repositories are bound to that transaction. Both
//! sides hand out concrete repository types, so service code written against
//! [`Repositories`] runs unchanged inside or outside a transaction.

use async_trait::async_trait;

use super::{
    CategoryRepository, EnrollmentRepository, GroupRepository, ScheduleRepository,
    SupervisorRepository,
};
use crate::error::DomainError;

pub trait Repositories: Send + Sync {
    type Categories: CategoryRepository;
    type Groups: GroupRepository;
    type Schedules: ScheduleRepository;
    type Supervisors: SupervisorRepository;
    type Enrollments: EnrollmentRepository;

    fn categories(&self) -> &Self::Categories;
    fn groups(&self) -> &Self::Groups;
    fn schedules(&self) -> &Self::Schedules;
    fn supervisors(&self) -> &Self::Supervisors;
    fn enrollments(&self) -> &Self::Enrollments;
}

/// Repositories bound to one open store transaction. Dropping without
/// `commit` discards every write made through them.
#[async_trait]
pub trait Transaction: Repositories + Sized {
    async fn commit(self) -> Result<(), DomainError>;
    async fn rollback(self) -> Result<(), DomainError>;
}

#[async_trait]
pub trait UnitOfWork: Repositories {
    type Tx: Transaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError>;
}
