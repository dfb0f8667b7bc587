use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::models::CategoryInput;
use crate::store::CategoryStore;

#[derive(Debug, Deserialize)]
pub struct CategorySearchQuery {
    pub search: Option<String>,
}

/// Lists the caller's categories, name-ordered, optionally narrowed by
/// `?search=`. Blank search terms are treated as absent.
#[get("")]
pub async fn get_categories(
    store: web::Data<CategoryStore>,
    user: AuthedUser,
    query: web::Query<CategorySearchQuery>,
) -> Result<impl Responder, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());

    let categories = store.list(user.user_id(), search).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/stats")]
pub async fn category_stats(
    store: web::Data<CategoryStore>,
    user: AuthedUser,
) -> Result<impl Responder, ApiError> {
    let total = store.count(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "total": total })))
}

#[get("/{id}")]
pub async fn get_category(
    store: web::Data<CategoryStore>,
    user: AuthedUser,
    category_id: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    match store.get(user.user_id(), category_id.into_inner()).await? {
        Some(category) => Ok(HttpResponse::Ok().json(category)),
        None => Err(ApiError::NotFound),
    }
}

#[post("")]
pub async fn create_category(
    store: web::Data<CategoryStore>,
    user: AuthedUser,
    category_data: web::Json<CategoryInput>,
) -> Result<impl Responder, ApiError> {
    let category = store
        .create(user.user_id(), category_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[put("/{id}")]
pub async fn update_category(
    store: web::Data<CategoryStore>,
    user: AuthedUser,
    category_id: web::Path<i64>,
    category_data: web::Json<CategoryInput>,
) -> Result<impl Responder, ApiError> {
    let category = store
        .update(
            user.user_id(),
            category_id.into_inner(),
            category_data.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/{id}")]
pub async fn delete_category(
    store: web::Data<CategoryStore>,
    user: AuthedUser,
    category_id: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    store
        .delete(user.user_id(), category_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Category deleted successfully!"
    })))
}
