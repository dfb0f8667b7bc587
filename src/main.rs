use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use todohub::auth::{AuthMiddleware, AuthService, PasswordHasher, TokenIssuer};
use todohub::config::Config;
use todohub::error::ApiError;
use todohub::routes;
use todohub::store::{CategoryStore, TodoStore, UserStore};
use todohub::{db, routes::health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let users = UserStore::new(pool.clone());
    let categories = CategoryStore::new(pool.clone());
    let todos = TodoStore::new(pool.clone(), categories.clone());
    let auth = AuthService::new(
        users,
        PasswordHasher::new(config.bcrypt_cost),
        TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_hours),
    );

    log::info!("Starting todohub server at {}", config.server_url());

    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(auth.clone()))
            .app_data(web::Data::new(categories.clone()))
            .app_data(web::Data::new(todos.clone()))
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
                    .wrap(AuthMiddleware::new(auth.clone()))
                    .configure(routes::config),
            )
    })
    .bind((server_host.as_str(), server_port))?
    .run()
    .await
}
