//! Shared wiring for the integration suites. Each test gets the same
//! application `main.rs` serves, assembled over a private in-memory SQLite
//! database, so tests never observe each other's state and need no external
//! services.

use actix_cors::Cors;
use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App, Error};
use serde_json::json;

use todohub::auth::{AuthMiddleware, AuthService, PasswordHasher, TokenIssuer};
use todohub::db;
use todohub::error::ApiError;
use todohub::routes::{self, health};
use todohub::store::{CategoryStore, TodoStore, UserStore};

/// Signing secret baked into the test app. Tests that mint their own tokens
/// (expired ones, for instance) must reuse it.
#[allow(dead_code)]
pub const JWT_SECRET: &str = "todohub-integration-secret";

const JWT_TTL_HOURS: i64 = 24;

// Minimum bcrypt cost keeps signup/signin fast under the suite.
const BCRYPT_COST: u32 = 4;

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

/// Builds the application exactly as `main.rs` wires it, on a fresh
/// in-memory database.
pub async fn spawn_app() -> impl Service<
    Request,
    Response = ServiceResponse<
        impl MessageBody<Error = impl Into<Error> + Into<Box<dyn std::error::Error>>>,
    >,
    Error = Error,
> {
    let pool = db::create_memory_pool()
        .await
        .expect("Failed to create in-memory database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let users = UserStore::new(pool.clone());
    let categories = CategoryStore::new(pool.clone());
    let todos = TodoStore::new(pool, categories.clone());
    let auth = AuthService::new(
        users,
        PasswordHasher::new(BCRYPT_COST),
        TokenIssuer::new(JWT_SECRET, JWT_TTL_HOURS),
    );

    test::init_service(
        App::new()
            .app_data(web::Data::new(auth.clone()))
            .app_data(web::Data::new(categories))
            .app_data(web::Data::new(todos))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::Validation(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::Validation(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                ApiError::Validation(err.to_string()).into()
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(auth))
                    .configure(routes::config),
            ),
    )
    .await
}

/// Registers an account and signs it in, returning its id and bearer token.
pub async fn register_and_login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error>,
    username: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let req_signup = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(&json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp_signup = test::call_service(app, req_signup).await;
    let signup_status = resp_signup.status();
    let signup_body = test::read_body(resp_signup).await;
    assert!(
        signup_status.is_success(),
        "Failed to sign up {}. Status: {}. Body: {:?}",
        username,
        signup_status,
        String::from_utf8_lossy(&signup_body)
    );

    let req_signin = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(&json!({
            "username": username,
            "password": password
        }))
        .to_request();
    let resp_signin = test::call_service(app, req_signin).await;
    assert!(
        resp_signin.status().is_success(),
        "Failed to sign in {}",
        username
    );
    let signin_body: serde_json::Value = test::read_body_json(resp_signin).await;

    TestUser {
        id: signin_body["id"]
            .as_i64()
            .expect("signin response carries the user id"),
        token: signin_body["token"]
            .as_str()
            .expect("signin response carries a token")
            .to_string(),
    }
}
