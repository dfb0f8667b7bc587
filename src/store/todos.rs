use chrono::{DateTime, NaiveTime, Utc};
use validator::Validate;

use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::{Todo, TodoInput, TodoListQuery, TodoStats};
use crate::store::CategoryStore;

/// Owner-scoped persistence for todos, including the derived views (search,
/// completion filter, due-date windows) and per-owner statistics. As with
/// categories, the owner id is part of every WHERE clause.
#[derive(Clone)]
pub struct TodoStore {
    pool: DbPool,
    categories: CategoryStore,
}

impl TodoStore {
    pub fn new(pool: DbPool, categories: CategoryStore) -> Self {
        Self { pool, categories }
    }

    /// Lists todos for the owner. A non-blank search term wins over the
    /// completion filter; with neither, all todos are returned. Results are
    /// newest-first.
    pub async fn list(&self, owner_id: i64, query: &TodoListQuery) -> Result<Vec<Todo>, ApiError> {
        if let Some(term) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            return self.search(owner_id, term).await;
        }

        if let Some(completed) = query.completed {
            return self.list_by_completed(owner_id, completed).await;
        }

        self.list_all(owner_id).await
    }

    pub async fn list_all(&self, owner_id: i64) -> Result<Vec<Todo>, ApiError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed, priority, due_date, category_id, user_id,
                    created_at, updated_at
             FROM todos
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    pub async fn list_by_completed(
        &self,
        owner_id: i64,
        completed: bool,
    ) -> Result<Vec<Todo>, ApiError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed, priority, due_date, category_id, user_id,
                    created_at, updated_at
             FROM todos
             WHERE user_id = ? AND completed = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Case-insensitive substring match on title or description.
    pub async fn search(&self, owner_id: i64, term: &str) -> Result<Vec<Todo>, ApiError> {
        let pattern = format!("%{}%", term);
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed, priority, due_date, category_id, user_id,
                    created_at, updated_at
             FROM todos
             WHERE user_id = ?
               AND (LOWER(title) LIKE LOWER(?) OR LOWER(description) LIKE LOWER(?))
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Todos due within the current UTC calendar day, soonest first.
    /// Completed todos are included; a deadline today is a deadline today.
    pub async fn due_today(&self, owner_id: i64) -> Result<Vec<Todo>, ApiError> {
        let (start, end) = utc_day_bounds(Utc::now());

        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed, priority, due_date, category_id, user_id,
                    created_at, updated_at
             FROM todos
             WHERE user_id = ? AND due_date >= ? AND due_date < ?
             ORDER BY due_date ASC, id ASC",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Incomplete todos whose deadline is strictly in the past.
    pub async fn overdue(&self, owner_id: i64) -> Result<Vec<Todo>, ApiError> {
        let now = Utc::now();

        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed, priority, due_date, category_id, user_id,
                    created_at, updated_at
             FROM todos
             WHERE user_id = ? AND completed = 0 AND due_date < ?
             ORDER BY due_date ASC, id ASC",
        )
        .bind(owner_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> Result<Option<Todo>, ApiError> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed, priority, due_date, category_id, user_id,
                    created_at, updated_at
             FROM todos
             WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    /// Creates a todo. New todos always start incomplete, whatever the
    /// client may have sent.
    pub async fn create(&self, owner_id: i64, input: TodoInput) -> Result<Todo, ApiError> {
        input.validate()?;

        let category_id = self.resolve_category(owner_id, input.category_id).await?;
        let priority = input.priority.unwrap_or_default();
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO todos (title, description, completed, priority, due_date, category_id,
                                user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(false)
        .bind(priority)
        .bind(input.due_date)
        .bind(category_id)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_category_violation)?;

        Ok(Todo {
            id: result.last_insert_rowid(),
            title: input.title,
            description: input.description,
            completed: false,
            priority,
            due_date: input.due_date,
            category_id,
            user_id: owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Full replacement of the editable fields. The completion flag is not
    /// editable here; it only moves through [`TodoStore::toggle`]. Omitting
    /// `category_id` detaches the todo from its category.
    pub async fn update(&self, owner_id: i64, id: i64, input: TodoInput) -> Result<Todo, ApiError> {
        input.validate()?;

        let existing = self.get(owner_id, id).await?.ok_or(ApiError::NotFound)?;

        let category_id = self.resolve_category(owner_id, input.category_id).await?;
        let priority = input.priority.unwrap_or_default();
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE todos SET title = ?, description = ?, priority = ?, due_date = ?,
                              category_id = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(priority)
        .bind(input.due_date)
        .bind(category_id)
        .bind(now)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_category_violation)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        Ok(Todo {
            id,
            title: input.title,
            description: input.description,
            completed: existing.completed,
            priority,
            due_date: input.due_date,
            category_id,
            user_id: owner_id,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Atomically flips the completion flag. Read-modify-write in a single
    /// statement, so two concurrent toggles land on the stored value in
    /// sequence instead of on a stale copy.
    pub async fn toggle(&self, owner_id: i64, id: i64) -> Result<Todo, ApiError> {
        let now = Utc::now();

        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET completed = NOT completed, updated_at = ?
             WHERE id = ? AND user_id = ?
             RETURNING id, title, description, completed, priority, due_date, category_id,
                       user_id, created_at, updated_at",
        )
        .bind(now)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        todo.ok_or(ApiError::NotFound)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        Ok(())
    }

    /// Completion counts from one SELECT, so total always equals
    /// completed + pending even under concurrent writes.
    pub async fn stats(&self, owner_id: i64) -> Result<TodoStats, ApiError> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM todos WHERE user_id = ?",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
        })
    }

    /// Checks that a requested category exists and belongs to the owner.
    /// Attaching to a missing or foreign category is an input error, not a
    /// not-found, so the todo operation reports what was wrong with the
    /// request rather than denying the todo itself exists.
    async fn resolve_category(
        &self,
        owner_id: i64,
        category_id: Option<i64>,
    ) -> Result<Option<i64>, ApiError> {
        match category_id {
            Some(id) => match self.categories.get(owner_id, id).await? {
                Some(category) => Ok(Some(category.id)),
                None => Err(ApiError::Validation("Category not found".into())),
            },
            None => Ok(None),
        }
    }
}

/// Half-open UTC day window containing `now`: [00:00:00 today, 00:00:00 tomorrow).
fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start + chrono::Duration::days(1);
    (start, end)
}

/// The only foreign key that can fail on todo writes is `category_id`; the
/// owner row is known to exist because the caller authenticated.
fn map_category_violation(error: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_error) = &error {
        if matches!(db_error.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
            return ApiError::Validation("Category not found".into());
        }
    }
    error.into()
}
