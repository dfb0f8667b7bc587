//!
//! # Error Handling
//!
//! This module defines the closed error taxonomy `ApiError` used throughout the
//! application. Every fallible operation returns one of these variants, and the
//! HTTP layer never invents status codes on its own: the mapping from variant to
//! response lives here and nowhere else.
//!
//! `ApiError` implements `actix_web::error::ResponseError` so handlers can
//! return `Result<_, ApiError>` and have failures converted into JSON error
//! responses automatically. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors` and `bcrypt::BcryptError` keep the `?`
//! operator ergonomic at the storage and hashing seams.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// All failure modes an operation can surface to a caller.
#[derive(Debug)]
pub enum ApiError {
    /// A request precondition on input shape or content failed (HTTP 400).
    Validation(String),
    /// The caller presented no token, or a token that does not verify (HTTP 401).
    Unauthenticated(String),
    /// The caller is known but not allowed to act on the resource (HTTP 403).
    /// Reserved: ownership misses are reported as `NotFound` so that resource
    /// ids owned by other users are indistinguishable from absent ones.
    #[allow(dead_code)]
    Forbidden(String),
    /// The resource does not exist for this owner (HTTP 404, empty body).
    NotFound,
    /// A uniqueness or referential rule rejected the write (HTTP 400).
    Conflict(String),
    /// A credential check failed: login, or the current-password gate on a
    /// password change. Deliberately carries no detail so that unknown
    /// usernames and wrong passwords are indistinguishable (HTTP 400).
    InvalidCredentials,
    /// An unexpected server-side failure (HTTP 500). The message is logged but
    /// never sent to the client.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid username or password"),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            ApiError::Unauthenticated(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            ApiError::Forbidden(msg) => HttpResponse::Forbidden().json(json!({
                "error": msg
            })),
            // Not-found responses carry no body, matching the behavior of
            // lookups that simply have nothing to say about the id.
            ApiError::NotFound => HttpResponse::NotFound().finish(),
            ApiError::Conflict(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            ApiError::InvalidCredentials => HttpResponse::BadRequest().json(json!({
                "error": "Invalid username or password"
            })),
            ApiError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

/// Maps `sqlx::Error::RowNotFound` to `NotFound`; everything else is an
/// internal failure whose detail stays on the server.
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> ApiError {
        match error {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            _ => ApiError::Internal(error.to_string()),
        }
    }
}

/// Preserves the per-field messages produced by the `validator` derive.
impl From<ValidationErrors> for ApiError {
    fn from(error: ValidationErrors) -> ApiError {
        ApiError::Validation(error.to_string())
    }
}

/// Hashing and verification failures are server faults, not user input faults.
impl From<bcrypt::BcryptError> for ApiError {
    fn from(error: bcrypt::BcryptError) -> ApiError {
        ApiError::Internal(error.to_string())
    }
}
