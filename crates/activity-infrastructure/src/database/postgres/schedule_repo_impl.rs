// ============================================================================
// Activity Infrastructure - PostgreSQL Schedule Repository
// File: crates/activity-infrastructure/src/database/postgres/schedule_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::FromRow;
use uuid::Uuid;

use activity_core::domain::Schedule;
use activity_core::error::{DomainError, EntityKind};
use activity_core::repositories::ScheduleRepository;

use super::executor::{db_error, PgExecutor};

#[derive(Clone)]
pub struct PgScheduleRepository {
    exec: PgExecutor,
}

impl PgScheduleRepository {
    pub(crate) fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
    pub id: Uuid,
    pub activity_group_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Schedule {
            id: row.id,
            activity_group_id: row.activity_group_id,
            day_of_week: row.day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Schedule>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<ScheduleRow> = sqlx::query_as(
            r#"
            SELECT id, activity_group_id, day_of_week, start_time, end_time
            FROM activity_schedules
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("finding schedule by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<Schedule>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let rows: Vec<ScheduleRow> = sqlx::query_as(
            r#"
            SELECT id, activity_group_id, day_of_week, start_time, end_time
            FROM activity_schedules
            WHERE activity_group_id = $1
            ORDER BY day_of_week, start_time
            "#
        )
        .bind(group_id)
        .fetch_all(conn.connection()?)
        .await
        .map_err(db_error("finding schedules by group"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, schedule: &Schedule) -> Result<Schedule, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: ScheduleRow = sqlx::query_as(
            r#"
            INSERT INTO activity_schedules (id, activity_group_id, day_of_week, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, activity_group_id, day_of_week, start_time, end_time
            "#
        )
        .bind(schedule.id)
        .bind(schedule.activity_group_id)
        .bind(schedule.day_of_week)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .fetch_one(conn.connection()?)
        .await
        .map_err(db_error("creating schedule"))?;

        Ok(row.into())
    }

    // activity_group_id is never written after insert
    async fn update(&self, schedule: &Schedule) -> Result<Schedule, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<ScheduleRow> = sqlx::query_as(
            r#"
            UPDATE activity_schedules
            SET day_of_week = $2, start_time = $3, end_time = $4
            WHERE id = $1
            RETURNING id, activity_group_id, day_of_week, start_time, end_time
            "#
        )
        .bind(schedule.id)
        .bind(schedule.day_of_week)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("updating schedule"))?;

        row.map(|r| r.into())
            .ok_or_else(|| DomainError::not_found(EntityKind::Schedule, schedule.id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_schedules WHERE id = $1")
            .bind(id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting schedule"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Schedule, *id));
        }
        Ok(())
    }

    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_schedules WHERE activity_group_id = $1")
            .bind(group_id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting schedules by group"))?;

        Ok(result.rows_affected())
    }
}
