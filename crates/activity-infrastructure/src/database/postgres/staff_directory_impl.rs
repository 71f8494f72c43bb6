//! Staff directory backed by the `staff` table

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use activity_core::error::DomainError;
use activity_core::repositories::StaffDirectory;

use super::executor::db_error;

pub struct PgStaffDirectory {
    pool: PgPool,
}

impl PgStaffDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffDirectory for PgStaffDirectory {
    async fn exists(&self, staff_id: &Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM staff WHERE id = $1 AND is_active)",
        )
        .bind(staff_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("checking staff existence"))
    }
}
