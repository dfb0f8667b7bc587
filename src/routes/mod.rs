pub mod auth;
pub mod categories;
pub mod health;
pub mod todos;

use actix_web::web;

/// Mounts every authenticated resource. Fixed paths (`/stats`, `/due-today`,
/// `/overdue`) are registered ahead of the `/{id}` matchers so they are not
/// swallowed as ids.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::signin)
            .service(auth::signup)
            .service(auth::me)
            .service(auth::update_profile)
            .service(auth::change_password)
            .service(auth::check_username)
            .service(auth::check_email)
            .service(auth::signout),
    )
    .service(
        web::scope("/categories")
            .service(categories::get_categories)
            .service(categories::category_stats)
            .service(categories::create_category)
            .service(categories::get_category)
            .service(categories::update_category)
            .service(categories::delete_category),
    )
    .service(
        web::scope("/todos")
            .service(todos::get_todos)
            .service(todos::todo_stats)
            .service(todos::due_today)
            .service(todos::overdue)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::toggle_todo)
            .service(todos::delete_todo),
    );
}
