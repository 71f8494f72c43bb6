// ============================================================================
// Activity Infrastructure - PostgreSQL Category Repository
// File: crates/activity-infrastructure/src/database/postgres/category_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;
use tracing::info;

use activity_core::domain::Category;
use activity_core::error::{DomainError, EntityKind};
use activity_core::repositories::CategoryRepository;

use super::executor::{db_error, PgExecutor};

#[derive(Clone)]
pub struct PgCategoryRepository {
    exec: PgExecutor,
}

impl PgCategoryRepository {
    pub(crate) fn new(exec: PgExecutor) -> Self {
        Self { exec }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Category>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description FROM activity_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("finding category by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description FROM activity_categories ORDER BY name",
        )
        .fetch_all(conn.connection()?)
        .await
        .map_err(db_error("listing categories"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, category: &Category) -> Result<Category, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: CategoryRow = sqlx::query_as(
            r#"
            INSERT INTO activity_categories (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(conn.connection()?)
        .await
        .map_err(db_error("creating category"))?;

        info!("Category row inserted: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, category: &Category) -> Result<Category, DomainError> {
        let mut conn = self.exec.acquire().await?;
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            UPDATE activity_categories
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .fetch_optional(conn.connection()?)
        .await
        .map_err(db_error("updating category"))?;

        row.map(|r| r.into())
            .ok_or_else(|| DomainError::not_found(EntityKind::Category, category.id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut conn = self.exec.acquire().await?;
        let result = sqlx::query("DELETE FROM activity_categories WHERE id = $1")
            .bind(id)
            .execute(conn.connection()?)
            .await
            .map_err(db_error("deleting category"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(EntityKind::Category, *id));
        }
        Ok(())
    }
}
