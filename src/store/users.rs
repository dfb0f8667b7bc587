use chrono::Utc;

use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::{Role, User};

/// Persistence for user accounts. Uniqueness of username and email is
/// guaranteed by UNIQUE constraints in the schema; the exists-helpers give
/// callers friendly pre-check errors, and [`map_unique_violation`] converts
/// a constraint rejection from the racy window between check and insert into
/// the same conflict error, so both paths report identically.
#[derive(Clone)]
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, first_name, last_name, role,
                    created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Case-sensitive exact lookup, used by login.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, first_name, last_name, role,
                    created_at, updated_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Inserts a new account with the `USER` role.
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, ApiError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, role,
                                created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(Role::User)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            role: Role::User,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn update_profile(
        &self,
        id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: &str,
    ) -> Result<User, ApiError> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, email = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(ApiError::NotFound)
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), ApiError> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        Ok(())
    }
}

/// SQLite reports the violated columns in the message, which is the only way
/// to tell the two uniqueness rules on `users` apart.
fn map_unique_violation(error: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_error) = &error {
        if matches!(db_error.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            let message = db_error.message();
            if message.contains("users.username") {
                return ApiError::Conflict("Username is already taken!".into());
            }
            if message.contains("users.email") {
                return ApiError::Conflict("Email is already in use!".into());
            }
        }
    }
    error.into()
}
