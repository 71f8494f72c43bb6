// ============================================================================
// Activity Infrastructure - PostgreSQL Supervisor Repository
// File: crates/activity-infrastructure/src/database/postgres/supervisor_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use tracing::error;

use activity_core::domain::SupervisorAssignment;
use activity_core::error::{DomainError, EntityKind};
use activity_core::repositories::SupervisorRepository;

use super::executor::{db_error, is_unique_violation, violates, PgExecutor};

const PRIMARY_INDEX: &str = "uq_activity_group_primary_supervisor";

#[derive(Clone)]
pub struct PgSupervisorRepository {
    exec: PgExecutor,
}

impl PgSupervisorRepository {
    pub(crate) fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

#[derive(Debug, FromRow)]
struct SupervisorRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub staff_id: Uuid,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SupervisorRow> for SupervisorAssignment {
    fn from(row: SupervisorRow) -> Self {
        SupervisorAssignment {
            id: row.id,
            group_id: row.group_id,
            staff_id: row.staff_id,
            is_primary: row.is_primary,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SupervisorRepository for PgSupervisorRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SupervisorAssignment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<SupervisorRow> = sqlx::query_as(
            r#"
            SELECT id, group_id, staff_id, is_primary, created_at
            FROM activity_group_supervisors
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("finding supervisor by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let rows: Vec<SupervisorRow> = sqlx::query_as(
            r#"
            SELECT id, group_id, staff_id, is_primary, created_at
            FROM activity_group_supervisors
            WHERE group_id = $1
            ORDER BY created_at, id
            "#
        )
        .bind(group_id)
        .fetch_all(conn.connection()?)
        .await
        .map_err(db_error("finding supervisors by group"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_staff(&self, staff_id: &Uuid) -> Result<Vec<SupervisorAssignment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let rows: Vec<SupervisorRow> = sqlx::query_as(
            r#"
            SELECT id, group_id, staff_id, is_primary, created_at
            FROM activity_group_supervisors
            WHERE staff_id = $1
            ORDER BY created_at, id
            "#
        )
        .bind(staff_id)
        .fetch_all(conn.connection()?)
        .await
        .map_err(db_error("finding supervisors by staff"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, assignment: &SupervisorAssignment) -> Result<SupervisorAssignment, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: SupervisorRow = sqlx::query_as(
            r#"
            INSERT INTO activity_group_supervisors (id, group_id, staff_id, is_primary, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, group_id, staff_id, is_primary, created_at
            "#
        )
        .bind(assignment.id)
        .bind(assignment.group_id)
        .bind(assignment.staff_id)
        .bind(assignment.is_primary)
        .bind(assignment.created_at)
        .fetch_one(conn.connection()?)
        .await
        .map_err(|e: sqlx::Error| {
            if is_unique_violation(&e) && !violates(&e, PRIMARY_INDEX) {
                DomainError::DuplicateSupervisor {
                    group_id: assignment.group_id,
                    staff_id: assignment.staff_id,
                }
            } else {
                error!("Database error creating supervisor: {}", e);
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, assignment: &SupervisorAssignment) -> Result<SupervisorAssignment, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<SupervisorRow> = sqlx::query_as(
            r#"
            UPDATE activity_group_supervisors
            SET staff_id = $2, is_primary = $3
            WHERE id = $1
            RETURNING id, group_id, staff_id, is_primary, created_at
            "#
        )
        .bind(assignment.id)
        .bind(assignment.staff_id)
        .bind(assignment.is_primary)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("updating supervisor"))?;

        row.map(|r| r.into())
            .ok_or_else(|| DomainError::not_found(EntityKind::Supervisor, assignment.id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_group_supervisors WHERE id = $1")
            .bind(id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting supervisor"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Supervisor, *id));
        }
        Ok(())
    }

    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_group_supervisors WHERE group_id = $1")
            .bind(group_id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting supervisors by group"))?;

        Ok(result.rows_affected())
    }
}
