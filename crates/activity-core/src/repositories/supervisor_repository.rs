//! Supervisor assignment repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::SupervisorAssignment;
use crate::error::DomainError;

/// `find_by_group` returns rows in a stable order (oldest first); the primary
/// repair after a delete promotes the first row it sees.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupervisorRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SupervisorAssignment>, DomainError>;
    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError>;
    async fn find_by_staff(&self, staff_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError>;
    async fn create(&self, assignment: &SupervisorAssignment) -> Result<SupervisorAssignment, DomainError>;
    async fn update(&self, assignment: &SupervisorAssignment) -> Result<SupervisorAssignment, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError>;
}
