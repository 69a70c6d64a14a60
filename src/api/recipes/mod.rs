pub mod by_author;
pub mod create;
pub mod cuisine;
pub mod delete;
pub mod dietary;
pub mod get;
pub mod list;
pub mod mine;
pub mod save;
pub mod saved;
pub mod search;
pub mod title;
pub mod unsave;
pub mod update;

use crate::models::Recipe;
use crate::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route("/search", get(search::search_recipes))
        .route("/search/cuisine", get(cuisine::search_by_cuisine))
        .route("/search/title", get(title::search_by_title))
        .route("/search/dietary", get(dietary::search_by_dietary_tag))
        .route("/user/my-recipes", get(mine::my_recipes))
        .route("/user/saved", get(saved::saved_recipes))
        .route("/author/{user_id}", get(by_author::recipes_by_author))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/save", post(save::save_recipe))
        .route("/{id}/unsave", delete(unsave::unsave_recipe))
}

/// Full recipe representation, including the fields the search endpoint
/// leaves out (ingredient quantities and preparation steps).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    /// Preparation time in minutes; null when the author never set one
    pub prep_time: Option<i64>,
    pub ingredient_names: Vec<String>,
    /// Ingredient name to quantity
    pub ingredients: BTreeMap<String, i64>,
    pub steps: String,
    pub dietary_preferences: Vec<String>,
    pub author_id: Uuid,
    pub favorites_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Recipe> for RecipeDetail {
    fn from(recipe: Recipe) -> Self {
        // Quantities live in a jsonb column; anything malformed collapses to
        // an empty map rather than failing the whole response.
        let ingredients = serde_json::from_value(recipe.ingredients).unwrap_or_default();

        Self {
            id: recipe.id,
            title: recipe.title,
            image: recipe.image,
            cuisine: recipe.cuisine,
            prep_time: recipe.prep_time,
            ingredient_names: recipe.ingredient_names.into_iter().flatten().collect(),
            ingredients,
            steps: recipe.steps,
            dietary_preferences: recipe.dietary_preferences.into_iter().flatten().collect(),
            author_id: recipe.author_id,
            favorites_count: recipe.favorites_count,
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

/// Shared response shape for the endpoints that return a plain list of
/// recipes (no pagination).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeDetail>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        search::search_recipes,
        cuisine::search_by_cuisine,
        title::search_by_title,
        dietary::search_by_dietary_tag,
        mine::my_recipes,
        saved::saved_recipes,
        by_author::recipes_by_author,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        save::save_recipe,
        unsave::unsave_recipe,
    ),
    components(schemas(
        RecipeDetail,
        RecipeListResponse,
        create::CreateRecipeRequest,
        create::CreateRecipeResponse,
        update::UpdateRecipeRequest,
        search::SearchResponse,
        search::SearchResult,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            id: Uuid::nil(),
            author_id: Uuid::nil(),
            title: "Dal".to_string(),
            image: None,
            cuisine: Some("Indian".to_string()),
            prep_time: Some(40),
            ingredient_names: vec![Some("lentils".to_string()), None, Some("cumin".to_string())],
            ingredients: serde_json::json!({"lentils": 200, "cumin": 1}),
            steps: "Simmer.".to_string(),
            dietary_preferences: vec![Some("Vegan".to_string())],
            favorites_count: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_detail_flattens_array_slots() {
        let detail = RecipeDetail::from(recipe());
        assert_eq!(detail.ingredient_names, vec!["lentils", "cumin"]);
        assert_eq!(detail.dietary_preferences, vec!["Vegan"]);
    }

    #[test]
    fn test_detail_parses_quantities() {
        let detail = RecipeDetail::from(recipe());
        assert_eq!(detail.ingredients.get("lentils"), Some(&200));
        assert_eq!(detail.ingredients.get("cumin"), Some(&1));
    }

    #[test]
    fn test_detail_tolerates_malformed_quantities() {
        let mut malformed = recipe();
        malformed.ingredients = serde_json::json!(["not", "a", "map"]);
        let detail = RecipeDetail::from(malformed);
        assert!(detail.ingredients.is_empty());
    }

    #[test]
    fn test_detail_serializes_camel_case() {
        let value = serde_json::to_value(RecipeDetail::from(recipe())).unwrap();
        assert!(value.get("prepTime").is_some());
        assert!(value.get("ingredientNames").is_some());
        assert!(value.get("dietaryPreferences").is_some());
        assert!(value.get("authorId").is_some());
        assert!(value.get("favoritesCount").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("prep_time").is_none());
    }
}
