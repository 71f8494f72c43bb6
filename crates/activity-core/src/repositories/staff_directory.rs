//! Staff directory (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::error::DomainError;

/// Existence check against the staff records owned by another subsystem.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn exists(&self, staff_id: &Uuid) -> Result<bool, DomainError>;
}
