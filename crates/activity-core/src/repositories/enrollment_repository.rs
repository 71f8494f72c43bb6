//! Enrollment repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Enrollment;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Enrollment>, DomainError>;
    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<Enrollment>, DomainError>;
    async fn find_by_student(&self, student_id: &Uuid) -> Result<Vec<Enrollment>, DomainError>;
    async fn find_by_group_and_student(
        &self,
        group_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Enrollment>, DomainError>;
    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment, DomainError>;
    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError>;
}
