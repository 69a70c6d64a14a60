use crate::api::recipes::{RecipeDetail, RecipeListResponse};
use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::dietary_preference_ilike;
use crate::get_conn;
use crate::models::Recipe;
use crate::raw_sql::escape_like;
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
pub struct DietarySearchParams {
    /// Dietary preference to look for, ignoring case (e.g. "vegan")
    pub tag: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/search/dietary",
    tag = "recipes",
    params(DietarySearchParams),
    responses(
        (status = 200, description = "Recipes carrying the given dietary preference", body = RecipeListResponse)
    )
)]
pub async fn search_by_dietary_tag(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<DietarySearchParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // ILIKE with no wildcards: case-insensitive equality against each
    // element, with any user-supplied metacharacters escaped
    let pattern = escape_like(params.tag.trim());

    let rows: Vec<Recipe> = match recipes::table
        .filter(recipes::deleted_at.is_null())
        .filter(dietary_preference_ilike!(&pattern))
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Dietary search failed: {}", e);
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
