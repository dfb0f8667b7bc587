use tokio::task;
use validator::Validate;

use crate::auth::password::PasswordHasher;
use crate::auth::token::{Claims, TokenIssuer};
use crate::auth::{ChangePasswordRequest, JwtResponse, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::error::ApiError;
use crate::models::User;
use crate::store::UserStore;

/// Orchestrates registration, login, identity resolution and profile
/// maintenance on top of [`UserStore`], [`PasswordHasher`] and [`TokenIssuer`].
///
/// Bcrypt work is pushed onto the blocking thread pool; at production cost a
/// hash takes long enough to stall an async worker otherwise.
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: UserStore, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates a new account. Username and email collisions are reported
    /// with distinct messages, checked upfront and backstopped by the
    /// schema's UNIQUE constraints.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        request.validate()?;

        if self.users.username_exists(&request.username).await? {
            return Err(ApiError::Conflict("Username is already taken!".into()));
        }
        if self.users.email_exists(&request.email).await? {
            return Err(ApiError::Conflict("Email is already in use!".into()));
        }

        let hasher = self.hasher;
        let password = request.password.clone();
        let password_hash = offload(move || hasher.hash(&password)).await?;

        self.users
            .insert(
                &request.username,
                &request.email,
                &password_hash,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
            )
            .await
    }

    /// Verifies a username/password pair and issues a token. Unknown
    /// usernames and wrong passwords both come back as
    /// [`ApiError::InvalidCredentials`], nothing distinguishes them.
    pub async fn login(&self, request: LoginRequest) -> Result<JwtResponse, ApiError> {
        request.validate()?;

        let user = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let hasher = self.hasher;
        let password = request.password;
        let stored_hash = user.password_hash.clone();
        let matches = offload(move || hasher.verify(&password, &stored_hash)).await?;

        if !matches {
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;

        Ok(JwtResponse {
            token,
            token_type: "Bearer".to_string(),
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }

    /// Turns a bearer token into the caller's identity. Expired and invalid
    /// tokens are indistinguishable to the caller.
    pub fn resolve_identity(&self, token: &str) -> Result<Claims, ApiError> {
        self.tokens
            .verify(token)
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token".into()))
    }

    /// Loads the account behind a verified identity. Data comes fresh from
    /// the store, not from the token, so profile edits are visible to
    /// sessions issued before the edit.
    pub async fn current_user(&self, user_id: i64) -> Result<User, ApiError> {
        self.users.find_by_id(user_id).await?.ok_or(ApiError::NotFound)
    }

    /// Replaces first name, last name and email. An email switch onto an
    /// address someone else holds is a conflict.
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        request.validate()?;

        let current = self.current_user(user_id).await?;

        if current.email != request.email && self.users.email_exists(&request.email).await? {
            return Err(ApiError::Conflict("Email is already in use!".into()));
        }

        self.users
            .update_profile(
                user_id,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
                &request.email,
            )
            .await
    }

    /// Replaces the password after verifying the current one. A wrong current
    /// password is a credential failure, reported exactly like a failed login.
    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        request.validate()?;

        let user = self.current_user(user_id).await?;

        let hasher = self.hasher;
        let current_password = request.current_password;
        let stored_hash = user.password_hash.clone();
        let matches = offload(move || hasher.verify(&current_password, &stored_hash)).await?;

        if !matches {
            return Err(ApiError::InvalidCredentials);
        }

        let new_password = request.new_password;
        let new_hash = offload(move || hasher.hash(&new_password)).await?;

        self.users.update_password(user_id, &new_hash).await
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool, ApiError> {
        Ok(!self.users.username_exists(username).await?)
    }

    pub async fn is_email_available(&self, email: &str) -> Result<bool, ApiError> {
        Ok(!self.users.email_exists(email).await?)
    }
}

/// Runs CPU-bound hashing work off the async executor.
async fn offload<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
}
