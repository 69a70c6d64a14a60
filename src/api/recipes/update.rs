use crate::api::recipes::RecipeDetail;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
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
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Partial update: absent fields keep their current value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub prep_time: Option<i64>,
    pub ingredient_names: Option<Vec<String>>,
    pub ingredients: Option<BTreeMap<String, i64>>,
    pub steps: Option<String>,
    pub dietary_preferences: Option<Vec<String>>,
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Title cannot be empty".to_string(),
            }),
        )
            .into_response();
    }
    if req.steps.as_deref().is_some_and(|s| s.trim().is_empty()) {
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

    let recipe: Recipe = match recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::deleted_at.is_null())
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response()
        }
    };

    if recipe.author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author can update this recipe".to_string(),
            }),
        )
            .into_response();
    }

    // Merge the request over the stored recipe
    let title = req
        .title
        .map(|t| t.trim().to_string())
        .unwrap_or(recipe.title);
    let image = req.image.or(recipe.image);
    let cuisine = req.cuisine.or(recipe.cuisine);
    let prep_time = req.prep_time.or(recipe.prep_time);
    let steps = req.steps.unwrap_or(recipe.steps);
    let ingredient_names: Vec<Option<String>> = match req.ingredient_names {
        Some(names) => names.into_iter().map(Some).collect(),
        None => recipe.ingredient_names,
    };
    let dietary_preferences: Vec<Option<String>> = match req.dietary_preferences {
        Some(prefs) => prefs.into_iter().map(Some).collect(),
        None => recipe.dietary_preferences,
    };
    let ingredients_json = match req.ingredients {
        Some(ref map) => match serde_json::to_value(map) {
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
        },
        None => recipe.ingredients,
    };

    let updated: Recipe = match diesel::update(recipes::table.find(id))
        .set((
            recipes::title.eq(title),
            recipes::image.eq(image),
            recipes::cuisine.eq(cuisine),
            recipes::prep_time.eq(prep_time),
            recipes::ingredient_names.eq(ingredient_names),
            recipes::ingredients.eq(ingredients_json),
            recipes::steps.eq(steps),
            recipes::dietary_preferences.eq(dietary_preferences),
        ))
        .returning(Recipe::as_returning())
        .get_result(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(RecipeDetail::from(updated))).into_response()
}
