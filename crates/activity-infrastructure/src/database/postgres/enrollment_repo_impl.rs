// ============================================================================
// Activity Infrastructure - PostgreSQL Enrollment Repository
// File: crates/activity-infrastructure/src/database/postgres/enrollment_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;
use tracing::error;

use activity_core::domain::{AttendanceStatus, Enrollment};
use activity_core::error::{DomainError, EntityKind};
use activity_core::repositories::EnrollmentRepository;

use super::executor::{db_error, is_unique_violation, PgExecutor};

#[derive(Clone)]
pub struct PgEnrollmentRepository {
    exec: PgExecutor,
}

impl PgEnrollmentRepository {
    pub(crate) fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

#[derive(Debug, FromRow)]
struct EnrollmentRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub activity_group_id: Uuid,
    pub enrollment_date: NaiveDate,
    pub attendance_status: Option<String>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            id: row.id,
            student_id: row.student_id,
            activity_group_id: row.activity_group_id,
            enrollment_date: row.enrollment_date,
            attendance_status: row
                .attendance_status
                .as_deref()
                .and_then(AttendanceStatus::from_str),
        }
    }
}

#[async_trait]
impl EnrollmentRepository for PgEnrollmentRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Enrollment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, activity_group_id, enrollment_date, attendance_status
            FROM activity_enrollments
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("finding enrollment by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_group(&self, group_id: &Uuid) -> Result<Vec<Enrollment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let rows: Vec<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, activity_group_id, enrollment_date, attendance_status
            FROM activity_enrollments
            WHERE activity_group_id = $1
            ORDER BY enrollment_date, id
            "#
        )
        .bind(group_id)
        .fetch_all(conn.connection()?)
        .await
        .map_err(db_error("finding enrollments by group"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_student(&self, student_id: &Uuid) -> Result<Vec<Enrollment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let rows: Vec<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, activity_group_id, enrollment_date, attendance_status
            FROM activity_enrollments
            WHERE student_id = $1
            ORDER BY enrollment_date, id
            "#
        )
        .bind(student_id)
        .fetch_all(conn.connection()?)
        .await
        .map_err(db_error("finding enrollments by student"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_group_and_student(
        &self,
        group_id: &Uuid,
        student_id: &Uuid,
    ) -> Result<Option<Enrollment>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, student_id, activity_group_id, enrollment_date, attendance_status
            FROM activity_enrollments
            WHERE activity_group_id = $1 AND student_id = $2
            "#
        )
        .bind(group_id)
        .bind(student_id)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("finding enrollment by group and student"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: EnrollmentRow = sqlx::query_as(
            r#"
            INSERT INTO activity_enrollments (
                id, student_id, activity_group_id, enrollment_date, attendance_status
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, activity_group_id, enrollment_date, attendance_status
            "#
        )
        .bind(enrollment.id)
        .bind(enrollment.student_id)
        .bind(enrollment.activity_group_id)
        .bind(enrollment.enrollment_date)
        .bind(enrollment.attendance_status.map(|s| s.as_str()))
        .fetch_one(conn.connection()?)
        .await
        .map_err(|e: sqlx::Error| {
            if is_unique_violation(&e) {
                DomainError::DuplicateEnrollment {
                    group_id: enrollment.activity_group_id,
                    student_id: enrollment.student_id,
                }
            } else {
                error!("Database error creating enrollment: {}", e);
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            UPDATE activity_enrollments
            SET enrollment_date = $2, attendance_status = $3
            WHERE id = $1
            RETURNING id, student_id, activity_group_id, enrollment_date, attendance_status
            "#
        )
        .bind(enrollment.id)
        .bind(enrollment.enrollment_date)
        .bind(enrollment.attendance_status.map(|s| s.as_str()))
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("updating enrollment"))?;

        row.map(|r| r.into())
            .ok_or_else(|| DomainError::not_found(EntityKind::Enrollment, enrollment.id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_enrollments WHERE id = $1")
            .bind(id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting enrollment"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Enrollment, *id));
        }
        Ok(())
    }

    async fn delete_by_group(&self, group_id: &Uuid) -> Result<u64, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_enrollments WHERE activity_group_id = $1")
            .bind(group_id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting enrollments by group"))?;

        Ok(result.rows_affected())
    }
}
