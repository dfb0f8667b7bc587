use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::models::{TodoInput, TodoListQuery};
use crate::store::TodoStore;

/// Lists the caller's todos, newest first. `?search=` narrows by title or
/// description and takes precedence over `?completed=`.
#[get("")]
pub async fn get_todos(
    store: web::Data<TodoStore>,
    user: AuthedUser,
    query: web::Query<TodoListQuery>,
) -> Result<impl Responder, ApiError> {
    let todos = store.list(user.user_id(), &query).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Completion counts for the caller.
#[get("/stats")]
pub async fn todo_stats(
    store: web::Data<TodoStore>,
    user: AuthedUser,
) -> Result<impl Responder, ApiError> {
    let stats = store.stats(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Todos whose deadline falls within the current UTC day.
#[get("/due-today")]
pub async fn due_today(
    store: web::Data<TodoStore>,
    user: AuthedUser,
) -> Result<impl Responder, ApiError> {
    let todos = store.due_today(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Incomplete todos already past their deadline.
#[get("/overdue")]
pub async fn overdue(
    store: web::Data<TodoStore>,
    user: AuthedUser,
) -> Result<impl Responder, ApiError> {
    let todos = store.overdue(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(todos))
}

#[get("/{id}")]
pub async fn get_todo(
    store: web::Data<TodoStore>,
    user: AuthedUser,
    todo_id: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    match store.get(user.user_id(), todo_id.into_inner()).await? {
        Some(todo) => Ok(HttpResponse::Ok().json(todo)),
        None => Err(ApiError::NotFound),
    }
}

#[post("")]
pub async fn create_todo(
    store: web::Data<TodoStore>,
    user: AuthedUser,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, ApiError> {
    let todo = store.create(user.user_id(), todo_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

#[put("/{id}")]
pub async fn update_todo(
    store: web::Data<TodoStore>,
    user: AuthedUser,
    todo_id: web::Path<i64>,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, ApiError> {
    let todo = store
        .update(user.user_id(), todo_id.into_inner(), todo_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Flips the completion flag and returns the refreshed todo.
#[patch("/{id}/toggle")]
pub async fn toggle_todo(
    store: web::Data<TodoStore>,
    user: AuthedUser,
    todo_id: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let todo = store.toggle(user.user_id(), todo_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

#[delete("/{id}")]
pub async fn delete_todo(
    store: web::Data<TodoStore>,
    user: AuthedUser,
    todo_id: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    store.delete(user.user_id(), todo_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Todo deleted successfully!"
    })))
}
