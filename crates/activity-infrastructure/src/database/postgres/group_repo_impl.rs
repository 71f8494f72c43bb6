// ============================================================================
// Activity Infrastructure - PostgreSQL Activity Group Repository
// File: crates/activity-infrastructure/src/database/postgres/group_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use tracing::info;

use activity_core::domain::{ActivityGroup, GroupFilter};
use activity_core::error::{DomainError, EntityKind};
use activity_core::repositories::GroupRepository;

use super::executor::{db_error, PgExecutor};

const GROUP_COLUMNS: &str = r#"
    id, name, category_id, max_participants, created_by,
    room_id, is_open, created_at, modified_at
"#;

#[derive(Clone)]
pub struct PgGroupRepository {
    exec: PgExecutor,
}

impl PgGroupRepository {
    pub(crate) fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ActivityGroupRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub max_participants: i32,
    pub created_by: Uuid,
    pub room_id: Option<Uuid>,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<ActivityGroupRow> for ActivityGroup {
    fn from(row: ActivityGroupRow) -> Self {
        ActivityGroup {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
            max_participants: row.max_participants,
            created_by: row.created_by,
            room_id: row.room_id,
            is_open: row.is_open,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ActivityGroup>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let sql = format!("SELECT {} FROM activity_groups WHERE id = $1", GROUP_COLUMNS);
        let row: Option<ActivityGroupRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(conn.connection()?)
            .await
            .map_err(db_error("finding activity group by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn lock_by_id(&self, id: &Uuid) -> Result<Option<ActivityGroup>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let sql = format!(
            "SELECT {} FROM activity_groups WHERE id = $1 FOR UPDATE",
            GROUP_COLUMNS
        );
        let row: Option<ActivityGroupRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(conn.connection()?)
            .await
            .map_err(db_error("locking activity group"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_category(&self, category_id: &Uuid) -> Result<Vec<ActivityGroup>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let sql = format!(
            "SELECT {} FROM activity_groups WHERE category_id = $1 ORDER BY name",
            GROUP_COLUMNS
        );
        let rows: Vec<ActivityGroupRow> = sqlx::query_as(&sql)
            .bind(category_id)
            .fetch_all(conn.connection()?)
            .await
            .map_err(db_error("finding activity groups by category"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list(&self, filter: &GroupFilter) -> Result<Vec<ActivityGroup>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let sql = format!(
            r#"
            SELECT {}
            FROM activity_groups
            WHERE ($1::uuid IS NULL OR category_id = $1)
              AND ($2::uuid IS NULL OR created_by = $2)
              AND ($3::boolean IS NULL OR is_open = $3)
            ORDER BY name
            "#,
            GROUP_COLUMNS
        );
        let rows: Vec<ActivityGroupRow> = sqlx::query_as(&sql)
            .bind(filter.category_id)
            .bind(filter.created_by)
            .bind(filter.is_open)
            .fetch_all(conn.connection()?)
            .await
            .map_err(db_error("listing activity groups"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, group: &ActivityGroup) -> Result<ActivityGroup, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let sql = format!(
            r#"
            INSERT INTO activity_groups (
                id, name, category_id, max_participants, created_by,
                room_id, is_open, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        );
        let row: ActivityGroupRow = sqlx::query_as(&sql)
            .bind(group.id)
            .bind(&group.name)
            .bind(group.category_id)
            .bind(group.max_participants)
            .bind(group.created_by)
            .bind(group.room_id)
            .bind(group.is_open)
            .bind(group.created_at)
            .bind(group.modified_at)
            .fetch_one(conn.connection()?)
            .await
            .map_err(db_error("creating activity group"))?;

        info!("Activity group row inserted: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let sql = format!(
            r#"
            UPDATE activity_groups
            SET
                name = $2,
                category_id = $3,
                max_participants = $4,
                room_id = $5,
                is_open = $6,
                modified_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            GROUP_COLUMNS
        );
        let row: Option<ActivityGroupRow> = sqlx::query_as(&sql)
            .bind(group.id)
            .bind(&group.name)
            .bind(group.category_id)
            .bind(group.max_participants)
            .bind(group.room_id)
            .bind(group.is_open)
            .bind(group.modified_at)
            .fetch_optional(conn.connection()?)
            .await
            .map_err(db_error("updating activity group"))?;

        row.map(|r| r.into())
            .ok_or_else(|| DomainError::not_found(EntityKind::Group, group.id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_groups WHERE id = $1")
            .bind(id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting activity group"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Group, *id));
        }
        Ok(())
    }
}
