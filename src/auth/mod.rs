pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Role;

// Re-export the pieces the rest of the crate wires together
pub use extractors::AuthedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenError, TokenIssuer};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Payload for a login request. Only presence is validated here; whether the
/// pair matches an account is decided by `AuthService::login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Payload for a new account registration.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Must be between 3 and 32 characters, alphanumeric, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32, message = "Username must be between 3 and 32 characters"),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub password: String,

    #[validate(length(max = 50, message = "First name must not exceed 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name must not exceed 50 characters"))]
    pub last_name: Option<String>,
}

/// Payload for replacing the caller's profile fields.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "First name must not exceed 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name must not exceed 50 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
}

/// Payload for a password change. The current password must verify before
/// the new one is accepted.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password must not be empty"))]
    pub current_password: String,

    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub new_password: String,
}

/// Response for a successful login: the bearer token plus enough identity
/// for a client to render who is signed in.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn valid_register() -> RegisterRequest {
        RegisterRequest {
            username: "test_user-123".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            first_name: Some("Test".to_string()),
            last_name: None,
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            username: "testuser".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_username = LoginRequest {
            username: "".to_string(),
            password: "password123".to_string(),
        };
        assert!(empty_username.validate().is_err());

        let empty_password = LoginRequest {
            username: "testuser".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        assert!(valid_register().validate().is_ok());

        let invalid_username = RegisterRequest {
            username: "test user!".to_string(), // Contains space and exclamation
            ..valid_register()
        };
        assert!(invalid_username.validate().is_err());

        let short_username = RegisterRequest {
            username: "tu".to_string(),
            ..valid_register()
        };
        assert!(short_username.validate().is_err());

        let invalid_email = RegisterRequest {
            email: "testexample.com".to_string(),
            ..valid_register()
        };
        assert!(invalid_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "12345".to_string(),
            ..valid_register()
        };
        assert!(short_password.validate().is_err());

        let long_first_name = RegisterRequest {
            first_name: Some("x".repeat(51)),
            ..valid_register()
        };
        assert!(long_first_name.validate().is_err());
    }

    #[test]
    fn test_change_password_request_validation() {
        let valid = ChangePasswordRequest {
            current_password: "oldpassword".to_string(),
            new_password: "newpassword".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_new = ChangePasswordRequest {
            current_password: "oldpassword".to_string(),
            new_password: "12345".to_string(),
        };
        assert!(short_new.validate().is_err());
    }

    #[test]
    fn test_jwt_response_serializes_type_field() {
        let response = JwtResponse {
            token: "abc".to_string(),
            token_type: "Bearer".to_string(),
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["type"], "Bearer");
        assert_eq!(json["role"], "USER");
    }
}
