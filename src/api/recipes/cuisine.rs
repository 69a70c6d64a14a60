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
pub struct CuisineSearchParams {
    /// Cuisine to match exactly, ignoring case
    #[serde(rename = "type")]
    pub cuisine_type: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/search/cuisine",
    tag = "recipes",
    params(CuisineSearchParams),
    responses(
        (status = 200, description = "Recipes with the given cuisine", body = RecipeListResponse)
    )
)]
pub async fn search_by_cuisine(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<CuisineSearchParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let rows: Vec<Recipe> = match recipes::table
        .filter(recipes::deleted_at.is_null())
        .filter(
            diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(cuisine) = LOWER(")
                .bind::<diesel::sql_types::Text, _>(&params.cuisine_type)
                .sql(")"),
        )
        .order(recipes::created_at.desc())
        .select(Recipe::as_select())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Cuisine search failed: {}", e);
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
