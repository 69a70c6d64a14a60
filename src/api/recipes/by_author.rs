use crate::api::recipes::{RecipeDetail, RecipeListResponse};
use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/recipes/author/{user_id}",
    tag = "recipes",
    params(
        ("user_id" = Uuid, Path, description = "Author's user ID")
    ),
    responses(
        (status = 200, description = "Recipes by the given author, newest first", body = RecipeListResponse)
    )
)]
pub async fn recipes_by_author(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match recipes::table
        .filter(recipes::author_id.eq(user_id))
        .filter(recipes::deleted_at.is_null())
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to list recipes by author: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recipes = rows.into_iter().map(RecipeDetail::from).collect();

    (StatusCode::OK, Json(RecipeListResponse { recipes })).into_response()
}
