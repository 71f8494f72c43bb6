//! Schedule repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Schedule;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Schedule>, DomainError>;
    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<Schedule>, DomainError>;
    async fn create(&self, schedule: &Schedule) -> Result<Schedule, DomainError>;
    async fn update(&self, schedule: &Schedule) -> Result<Schedule, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError>;
}
