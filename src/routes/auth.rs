use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;

use crate::auth::{
    AuthService, AuthedUser, ChangePasswordRequest, EmailQuery, LoginRequest, RegisterRequest,
    UpdateProfileRequest, UsernameQuery,
};
use crate::error::ApiError;
use crate::models::UserResponse;

/// Authenticate with a username/password pair.
///
/// Returns the bearer token and an identity summary. Failures are a uniform
/// 400, whatever the reason.
#[post("/signin")]
pub async fn signin(
    auth: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, ApiError> {
    let response = auth.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Register a new account.
#[post("/signup")]
pub async fn signup(
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    let user = auth.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User registered successfully!",
        "username": user.username
    })))
}

/// The profile behind the presented token, loaded fresh from the store.
#[get("/me")]
pub async fn me(
    auth: web::Data<AuthService>,
    user: AuthedUser,
) -> Result<impl Responder, ApiError> {
    let current = auth.current_user(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(current)))
}

/// Replace the caller's name fields and email.
#[put("/profile")]
pub async fn update_profile(
    auth: web::Data<AuthService>,
    user: AuthedUser,
    profile_data: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, ApiError> {
    let updated = auth
        .update_profile(user.user_id(), profile_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully!",
        "user": UserResponse::from(updated)
    })))
}

/// Change the caller's password, gated on the current one.
#[post("/change-password")]
pub async fn change_password(
    auth: web::Data<AuthService>,
    user: AuthedUser,
    password_data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, ApiError> {
    auth.change_password(user.user_id(), password_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password changed successfully!"
    })))
}

/// Pre-registration availability probe for usernames.
#[get("/check-username")]
pub async fn check_username(
    auth: web::Data<AuthService>,
    query: web::Query<UsernameQuery>,
) -> Result<impl Responder, ApiError> {
    let available = auth.is_username_available(&query.username).await?;
    Ok(HttpResponse::Ok().json(json!({ "available": available })))
}

/// Pre-registration availability probe for email addresses.
#[get("/check-email")]
pub async fn check_email(
    auth: web::Data<AuthService>,
    query: web::Query<EmailQuery>,
) -> Result<impl Responder, ApiError> {
    let available = auth.is_email_available(&query.email).await?;
    Ok(HttpResponse::Ok().json(json!({ "available": available })))
}

/// Sessions live entirely in the token, so there is nothing to revoke
/// server-side; the endpoint exists so clients have a definite sign-out
/// handshake. Requires a valid token like any other protected route.
#[post("/signout")]
pub async fn signout(_user: AuthedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "You've been signed out!"
    }))
}
