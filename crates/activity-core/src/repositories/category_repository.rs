//! Category repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Category;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Category>, DomainError>;
    async fn list(&self) -> Result<Vec<Category>, DomainError>;
    async fn create(&self, category: &Category) -> Result<Category, DomainError>;
    async fn update(&self, category: &Category) -> Result<Category, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
