use chrono::Utc;
use validator::Validate;

use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::{Category, CategoryInput, DEFAULT_COLOR};

/// Owner-scoped persistence for categories. Every query carries the owner id
/// in its WHERE clause, so a category belonging to someone else behaves
/// exactly like one that does not exist.
#[derive(Clone)]
pub struct CategoryStore {
    pool: DbPool,
}

impl CategoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lists the owner's categories ordered by name. A search term narrows
    /// the result to categories whose name or description contains it,
    /// case-insensitively.
    pub async fn list(
        &self,
        owner_id: i64,
        search: Option<&str>,
    ) -> Result<Vec<Category>, ApiError> {
        let categories = match search {
            Some(term) => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, Category>(
                    "SELECT c.id, c.name, c.description, c.color, c.user_id,
                            (SELECT COUNT(*) FROM todos t WHERE t.category_id = c.id) AS todo_count,
                            c.created_at, c.updated_at
                     FROM categories c
                     WHERE c.user_id = ?
                       AND (LOWER(c.name) LIKE LOWER(?) OR LOWER(c.description) LIKE LOWER(?))
                     ORDER BY c.name ASC",
                )
                .bind(owner_id)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Category>(
                    "SELECT c.id, c.name, c.description, c.color, c.user_id,
                            (SELECT COUNT(*) FROM todos t WHERE t.category_id = c.id) AS todo_count,
                            c.created_at, c.updated_at
                     FROM categories c
                     WHERE c.user_id = ?
                     ORDER BY c.name ASC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(categories)
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name, c.description, c.color, c.user_id,
                    (SELECT COUNT(*) FROM todos t WHERE t.category_id = c.id) AS todo_count,
                    c.created_at, c.updated_at
             FROM categories c
             WHERE c.id = ? AND c.user_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn create(&self, owner_id: i64, input: CategoryInput) -> Result<Category, ApiError> {
        input.validate()?;

        if self.name_exists(owner_id, &input.name).await? {
            return Err(ApiError::Conflict(
                "Category with this name already exists".into(),
            ));
        }

        let now = Utc::now();
        let color = input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());

        let result = sqlx::query(
            "INSERT INTO categories (name, description, color, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&color)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_name_conflict)?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: input.name,
            description: input.description,
            color,
            user_id: owner_id,
            todo_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Full replacement of name, description and color. Keeping the current
    /// name is always allowed; taking another category's name is a conflict.
    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        input: CategoryInput,
    ) -> Result<Category, ApiError> {
        input.validate()?;

        let existing = self.get(owner_id, id).await?.ok_or(ApiError::NotFound)?;

        if existing.name != input.name && self.name_exists(owner_id, &input.name).await? {
            return Err(ApiError::Conflict(
                "Category with this name already exists".into(),
            ));
        }

        let now = Utc::now();
        let color = input.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());

        let result = sqlx::query(
            "UPDATE categories SET name = ?, description = ?, color = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&color)
        .bind(now)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_name_conflict)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        Ok(Category {
            id,
            name: input.name,
            description: input.description,
            color,
            user_id: owner_id,
            todo_count: existing.todo_count,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Deletes an empty category. A category still referenced by todos is
    /// protected both by the upfront count and by the foreign key constraint.
    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), ApiError> {
        let existing = self.get(owner_id, id).await?.ok_or(ApiError::NotFound)?;

        if existing.todo_count > 0 {
            return Err(ApiError::Conflict(
                "Cannot delete category with existing todos".into(),
            ));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(map_in_use_conflict)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        Ok(())
    }

    pub async fn count(&self, owner_id: i64) -> Result<i64, ApiError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE user_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn name_exists(&self, owner_id: i64, name: &str) -> Result<bool, ApiError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE name = ? AND user_id = ?")
                .bind(name)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }
}

fn map_name_conflict(error: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_error) = &error {
        if matches!(db_error.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return ApiError::Conflict("Category with this name already exists".into());
        }
    }
    error.into()
}

fn map_in_use_conflict(error: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_error) = &error {
        if matches!(db_error.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
            return ApiError::Conflict("Cannot delete category with existing todos".into());
        }
    }
    error.into()
}
