use crate::api::recipes::{RecipeDetail, RecipeListResponse};
use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::recipes;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct TitleSearchParams {
    /// Title to match exactly, ignoring case
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/search/title",
    tag = "recipes",
    params(TitleSearchParams),
    responses(
        (status = 200, description = "Recipes with the given title", body = RecipeListResponse)
    )
)]
pub async fn search_by_title(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<TitleSearchParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match recipes::table
        .filter(recipes::deleted_at.is_null())
        .filter(
            diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(title) = LOWER(")
                .bind::<diesel::sql_types::Text, _>(&params.name)
                .sql(")"),
        )
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Title search failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to search recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recipes = rows.into_iter().map(RecipeDetail::from).collect();

    (StatusCode::OK, Json(RecipeListResponse { recipes })).into_response()
}
