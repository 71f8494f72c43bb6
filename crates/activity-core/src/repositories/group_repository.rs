//! Activity group repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{ActivityGroup, GroupFilter};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ActivityGroup>, DomainError>;
    /// Reads the group and holds its row lock until the surrounding
    /// transaction ends. Outside a transaction it behaves like `find_by_id`.
    async fn lock_by_id(&self, id: &Uuid) -> Result<Option<ActivityGroup>, DomainError>;
    async fn find_by_category(&self, category_id: &Uuid) -> Result<Vec<ActivityGroup>, DomainError>;
    async fn list(&self, filter: &GroupFilter) -> Result<Vec<ActivityGroup>, DomainError>;
    async fn create(&self, group: &ActivityGroup) -> Result<ActivityGroup, DomainError>;
    async fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
