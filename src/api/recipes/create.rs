use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::NewRecipe;
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    /// Preparation time in minutes
    pub prep_time: Option<i64>,
    #[serde(default)]
    pub ingredient_names: Vec<String>,
    /// Ingredient name to quantity
    #[serde(default)]
    pub ingredients: BTreeMap<String, i64>,
    pub steps: String,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    if req.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Title cannot be empty".to_string(),
            }),
        )
            .into_response();
    }
    if req.steps.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Steps cannot be empty".to_string(),
            }),
        )
            .into_response();
    }
    if req.prep_time.is_some_and(|minutes| minutes < 0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Prep time cannot be negative".to_string(),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    let ingredients_json = match serde_json::to_value(&req.ingredients) {
        Ok(v) => v,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid ingredients format".to_string(),
                }),
            )
                .into_response()
        }
    };

    let ingredient_names: Vec<Option<String>> =
        req.ingredient_names.into_iter().map(Some).collect();
    let dietary_preferences: Vec<Option<String>> =
        req.dietary_preferences.into_iter().map(Some).collect();

    let new_recipe = NewRecipe {
        author_id: user.id,
        title: req.title.trim(),
        image: req.image.as_deref(),
        cuisine: req.cuisine.as_deref(),
        prep_time: req.prep_time,
        ingredient_names: &ingredient_names,
        ingredients: ingredients_json,
        steps: &req.steps,
        dietary_preferences: &dietary_preferences,
    };

    let recipe_id: Uuid = match diesel::insert_into(recipes::table)
        .values(&new_recipe)
        .returning(recipes::id)
        .get_result(&mut conn)
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(CreateRecipeResponse { id: recipe_id }),
    )
        .into_response()
}
