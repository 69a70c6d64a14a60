use crate::api::{ErrorResponse, ValidationErrorResponse};
use crate::db::DbPool;
use crate::get_conn;
use crate::raw_sql::escape_like;
use crate::schema::{recipes, users};
use crate::{dietary_preference_eq_any, ingredient_name_ilike};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::helper_types::{IntoBoxed, LeftJoin};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const DEFAULT_PAGE: i64 = 0;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free text matched against title and ingredient names (case-insensitive substring)
    pub search_text: Option<String>,
    /// Ingredient name to look for (case-insensitive substring)
    pub ingredient: Option<String>,
    /// Cuisine to look for (case-insensitive substring)
    pub cuisine: Option<String>,
    /// Dietary preference the recipe must carry, matched exactly (e.g. "Vegan")
    pub dietary_preference: Option<String>,
    /// Upper bound on preparation time in minutes; zero or negative disables the bound
    pub max_prep_time: Option<i64>,
    /// Sort field: "prepTime", "favorites", or anything else for newest-first
    pub sort_by: Option<String>,
    /// Page number, 0-based (default: 0)
    pub page: Option<i64>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<i64>,
}

/// Filters normalized out of the raw query parameters. Blank or whitespace
/// strings become "no constraint", substring filters are pre-escaped ILIKE
/// patterns (owned here so the boxed queries below can borrow them), and a
/// non-positive max prep time is discarded.
#[derive(Debug, Default, PartialEq)]
struct SearchFilters {
    text_pattern: Option<String>,
    ingredient_pattern: Option<String>,
    cuisine_pattern: Option<String>,
    dietary_preference: Option<String>,
    max_prep_time: Option<i64>,
}

impl SearchFilters {
    fn from_params(params: &SearchParams) -> Self {
        Self {
            text_pattern: normalized(&params.search_text).map(like_pattern),
            ingredient_pattern: normalized(&params.ingredient).map(like_pattern),
            cuisine_pattern: normalized(&params.cuisine).map(like_pattern),
            dietary_preference: normalized(&params.dietary_preference).map(String::from),
            max_prep_time: params.max_prep_time.filter(|&minutes| minutes > 0),
        }
    }
}

fn normalized(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn like_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

/// Sort order for search results, resolved case-insensitively from `sortBy`.
/// Unrecognized values (including "relevance", which has no scoring behind
/// it) fall back to newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortField {
    PrepTime,
    Favorites,
    Recency,
}

impl SortField {
    fn resolve(sort_by: Option<&str>) -> Self {
        match sort_by.map(str::to_lowercase).as_deref() {
            Some("preptime") => SortField::PrepTime,
            Some("favorites") => SortField::Favorites,
            _ => SortField::Recency,
        }
    }
}

/// A validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageWindow {
    page: i64,
    limit: i64,
}

impl PageWindow {
    /// Applies defaults and bounds-checks `page` and `limit`, collecting
    /// every violated constraint rather than stopping at the first.
    fn from_params(page: Option<i64>, limit: Option<i64>) -> Result<Self, Vec<String>> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        let mut errors = Vec::new();
        if page < 0 {
            errors.push("Page must be 0 or greater".to_string());
        }
        if limit < 1 {
            errors.push("Limit must be at least 1".to_string());
        } else if limit > MAX_LIMIT {
            errors.push("Limit cannot exceed 100".to_string());
        }

        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(errors)
        }
    }

    fn offset(&self) -> i64 {
        self.page * self.limit
    }

    /// ceil(total / limit). A request for a page at or past this bound is
    /// legal and returns an empty page, not an error.
    fn total_pages(&self, total_count: i64) -> i64 {
        (total_count + self.limit - 1) / self.limit
    }
}

type BoxedSearchQuery<'a> = IntoBoxed<'a, LeftJoin<recipes::table, users::table>, Pg>;

/// Builds the one composite predicate behind a search: recipes left-joined
/// to their author, soft-deleted rows excluded, and every present filter
/// ANDed on. Both the page fetch and the total count run over this same
/// query, so ordering and the window are left to the caller.
fn filtered_recipes(filters: &SearchFilters) -> BoxedSearchQuery<'_> {
    let mut query = recipes::table.left_join(users::table).into_boxed();

    query = query.filter(recipes::deleted_at.is_null());

    if let Some(ref pattern) = filters.text_pattern {
        query = query.filter(
            recipes::title
                .ilike(pattern)
                .or(ingredient_name_ilike!(pattern)),
        );
    }

    if let Some(ref pattern) = filters.ingredient_pattern {
        query = query.filter(ingredient_name_ilike!(pattern));
    }

    if let Some(ref pattern) = filters.cuisine_pattern {
        query = query.filter(recipes::cuisine.ilike(pattern));
    }

    if let Some(ref preference) = filters.dietary_preference {
        query = query.filter(dietary_preference_eq_any!(preference));
    }

    if let Some(minutes) = filters.max_prep_time {
        query = query.filter(recipes::prep_time.le(minutes));
    }

    query
}

fn apply_sort(query: BoxedSearchQuery<'_>, sort: SortField) -> BoxedSearchQuery<'_> {
    let query = match sort {
        // Recipes without a prep time sort after every timed one
        SortField::PrepTime => query.order(recipes::prep_time.desc().nulls_last()),
        SortField::Favorites => query.order(recipes::favorites_count.desc()),
        SortField::Recency => query.order(recipes::created_at.desc()),
    };

    // Ties broken by id so pages never overlap or drop rows
    query.then_order_by(recipes::id.desc())
}

#[derive(Debug, Queryable)]
struct SearchRow {
    id: Uuid,
    title: String,
    image: Option<String>,
    cuisine: Option<String>,
    prep_time: Option<i64>,
    ingredient_names: Vec<Option<String>>,
    dietary_preferences: Vec<Option<String>>,
    favorites_count: i32,
    author_name: Option<String>,
}

/// One row of a search result page. Detail-only fields (ingredient
/// quantities, steps) are deliberately absent.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub cuisine: Option<String>,
    pub prep_time: Option<i64>,
    pub ingredient_names: Vec<String>,
    pub dietary_preferences: Vec<String>,
    pub favorites_count: i32,
    /// Author display name, resolved at query time; null when the author
    /// record is gone
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub recipes: Vec<SearchResult>,
    /// Total matches across all pages
    pub total_count: i64,
    /// The 0-based page this response covers
    pub current_page: i64,
    pub total_pages: i64,
}

#[utoipa::path(
    get,
    path = "/api/recipes/search",
    tag = "recipes",
    params(SearchParams),
    responses(
        (status = 200, description = "Paginated search results", body = SearchResponse),
        (status = 400, description = "Invalid pagination parameters", body = ValidationErrorResponse),
        (status = 500, description = "Search failed", body = ErrorResponse)
    )
)]
pub async fn search_recipes(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let window = match PageWindow::from_params(params.page, params.limit) {
        Ok(w) => w,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse {
                    message: "Validation failed".to_string(),
                    errors,
                }),
            )
                .into_response()
        }
    };

    let filters = SearchFilters::from_params(&params);
    let sort = SortField::resolve(params.sort_by.as_deref());

    let mut conn = get_conn!(pool);

    let rows: Vec<SearchRow> = match apply_sort(filtered_recipes(&filters), sort)
        .select((
            recipes::id,
            recipes::title,
            recipes::image,
            recipes::cuisine,
            recipes::prep_time,
            recipes::ingredient_names,
            recipes::dietary_preferences,
            recipes::favorites_count,
            users::username.nullable(),
        ))
        .limit(window.limit)
        .offset(window.offset())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Search query failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to search recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    // The count runs as its own query over the same filters, so the totals
    // stay correct even when the requested page is past the end.
    let total_count: i64 = match filtered_recipes(&filters).count().get_result(&mut conn) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Search count failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to search recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let recipes = rows
        .into_iter()
        .map(|row| SearchResult {
            id: row.id,
            title: row.title,
            image: row.image,
            cuisine: row.cuisine,
            prep_time: row.prep_time,
            ingredient_names: row.ingredient_names.into_iter().flatten().collect(),
            dietary_preferences: row.dietary_preferences.into_iter().flatten().collect(),
            favorites_count: row.favorites_count,
            author_name: row.author_name,
        })
        .collect();

    (
        StatusCode::OK,
        Json(SearchResponse {
            recipes,
            total_count,
            current_page: window.page,
            total_pages: window.total_pages(total_count),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    fn filters(params: &SearchParams) -> SearchFilters {
        SearchFilters::from_params(params)
    }

    fn sql_for(filters: &SearchFilters) -> String {
        debug_query::<Pg, _>(&filtered_recipes(filters)).to_string()
    }

    fn sorted_sql(sort: SortField) -> String {
        let filters = SearchFilters::default();
        let sql = debug_query::<Pg, _>(&apply_sort(filtered_recipes(&filters), sort)).to_string();
        sql
    }

    #[test]
    fn test_no_params_means_no_filters() {
        assert_eq!(filters(&SearchParams::default()), SearchFilters::default());
    }

    #[test]
    fn test_blank_params_treated_as_absent() {
        let params = SearchParams {
            search_text: Some(String::new()),
            ingredient: Some("   ".to_string()),
            cuisine: Some("\t".to_string()),
            dietary_preference: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(filters(&params), SearchFilters::default());
    }

    #[test]
    fn test_params_are_trimmed_before_matching() {
        let params = SearchParams {
            search_text: Some("  pasta  ".to_string()),
            dietary_preference: Some(" Vegan ".to_string()),
            ..Default::default()
        };
        let f = filters(&params);
        assert_eq!(f.text_pattern.as_deref(), Some("%pasta%"));
        assert_eq!(f.dietary_preference.as_deref(), Some("Vegan"));
    }

    #[test]
    fn test_text_pattern_escapes_like_wildcards() {
        let params = SearchParams {
            search_text: Some("50%_rice".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters(&params).text_pattern.as_deref(),
            Some("%50\\%\\_rice%")
        );
    }

    #[test]
    fn test_dietary_preference_is_not_a_pattern() {
        let params = SearchParams {
            dietary_preference: Some("Gluten-Free".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters(&params).dietary_preference.as_deref(),
            Some("Gluten-Free")
        );
    }

    #[test]
    fn test_nonpositive_max_prep_time_disables_bound() {
        for minutes in [0, -1, -30] {
            let params = SearchParams {
                max_prep_time: Some(minutes),
                ..Default::default()
            };
            assert_eq!(filters(&params).max_prep_time, None);
        }

        let params = SearchParams {
            max_prep_time: Some(45),
            ..Default::default()
        };
        assert_eq!(filters(&params).max_prep_time, Some(45));
    }

    #[test]
    fn test_sort_resolves_case_insensitively() {
        assert_eq!(SortField::resolve(Some("preptime")), SortField::PrepTime);
        assert_eq!(SortField::resolve(Some("prepTime")), SortField::PrepTime);
        assert_eq!(SortField::resolve(Some("PREPTIME")), SortField::PrepTime);
        assert_eq!(SortField::resolve(Some("Favorites")), SortField::Favorites);
    }

    #[test]
    fn test_unrecognized_sort_falls_back_to_newest_first() {
        assert_eq!(SortField::resolve(None), SortField::Recency);
        assert_eq!(SortField::resolve(Some("relevance")), SortField::Recency);
        assert_eq!(SortField::resolve(Some("createdAt")), SortField::Recency);
        assert_eq!(SortField::resolve(Some("soup")), SortField::Recency);
    }

    #[test]
    fn test_window_defaults() {
        let window = PageWindow::from_params(None, None).unwrap();
        assert_eq!(window.page, 0);
        assert_eq!(window.limit, 10);
    }

    #[test]
    fn test_window_accepts_boundary_values() {
        assert!(PageWindow::from_params(Some(0), Some(1)).is_ok());
        assert!(PageWindow::from_params(Some(0), Some(100)).is_ok());
    }

    #[test]
    fn test_window_rejects_negative_page() {
        let errors = PageWindow::from_params(Some(-1), None).unwrap_err();
        assert_eq!(errors, vec!["Page must be 0 or greater"]);
    }

    #[test]
    fn test_window_rejects_limit_below_one() {
        let errors = PageWindow::from_params(None, Some(0)).unwrap_err();
        assert_eq!(errors, vec!["Limit must be at least 1"]);
    }

    #[test]
    fn test_window_rejects_limit_above_max() {
        let errors = PageWindow::from_params(None, Some(101)).unwrap_err();
        assert_eq!(errors, vec!["Limit cannot exceed 100"]);
    }

    #[test]
    fn test_window_collects_every_violation() {
        let errors = PageWindow::from_params(Some(-3), Some(-2)).unwrap_err();
        assert_eq!(
            errors,
            vec!["Page must be 0 or greater", "Limit must be at least 1"]
        );
    }

    #[test]
    fn test_offset_is_page_times_limit() {
        let window = PageWindow::from_params(Some(2), Some(10)).unwrap();
        assert_eq!(window.offset(), 20);

        let window = PageWindow::from_params(Some(3), Some(25)).unwrap();
        assert_eq!(window.offset(), 75);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let window = PageWindow::from_params(None, Some(10)).unwrap();
        assert_eq!(window.total_pages(0), 0);
        assert_eq!(window.total_pages(9), 1);
        assert_eq!(window.total_pages(10), 1);
        assert_eq!(window.total_pages(25), 3);
        assert_eq!(window.total_pages(30), 3);
        assert_eq!(window.total_pages(31), 4);
    }

    #[test]
    fn test_base_query_excludes_soft_deleted_rows() {
        let sql = sql_for(&SearchFilters::default());
        assert!(sql.contains(r#""recipes"."deleted_at" IS NULL"#), "{sql}");
        assert!(!sql.contains("ILIKE"), "{sql}");
        assert!(!sql.contains("= ANY"), "{sql}");
    }

    #[test]
    fn test_text_filter_searches_title_and_ingredient_names() {
        let f = SearchFilters {
            text_pattern: Some("%pasta%".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&f);
        assert!(sql.contains(r#""recipes"."title" ILIKE"#), "{sql}");
        assert!(sql.contains("unnest(recipes.ingredient_names)"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn test_ingredient_filter_probes_name_array() {
        let f = SearchFilters {
            ingredient_pattern: Some("%basil%".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&f);
        assert!(sql.contains("unnest(recipes.ingredient_names)"), "{sql}");
        assert!(sql.contains("ingredient ILIKE"), "{sql}");
    }

    #[test]
    fn test_cuisine_filter_is_substring_match() {
        let f = SearchFilters {
            cuisine_pattern: Some("%ital%".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&f);
        assert!(sql.contains(r#""recipes"."cuisine" ILIKE"#), "{sql}");
    }

    #[test]
    fn test_dietary_filter_is_exact_membership() {
        let f = SearchFilters {
            dietary_preference: Some("Vegan".to_string()),
            ..Default::default()
        };
        let sql = sql_for(&f);
        assert!(sql.contains("= ANY(recipes.dietary_preferences)"), "{sql}");
        assert!(!sql.contains("ILIKE"), "{sql}");
    }

    #[test]
    fn test_prep_time_filter_is_upper_bound() {
        let f = SearchFilters {
            max_prep_time: Some(30),
            ..Default::default()
        };
        let sql = sql_for(&f);
        assert!(sql.contains(r#""recipes"."prep_time" <="#), "{sql}");
    }

    #[test]
    fn test_present_filters_compose_with_and() {
        let f = SearchFilters {
            text_pattern: Some("%pasta%".to_string()),
            dietary_preference: Some("Vegan".to_string()),
            max_prep_time: Some(30),
            ..Default::default()
        };
        let sql = sql_for(&f);
        // deleted_at guard plus three filters joined by AND
        assert!(sql.matches(" AND ").count() >= 3, "{sql}");
    }

    #[test]
    fn test_sort_orders_by_resolved_field_descending() {
        let sql = sorted_sql(SortField::PrepTime);
        assert!(
            sql.contains(r#"ORDER BY "recipes"."prep_time" DESC NULLS LAST"#),
            "{sql}"
        );

        let sql = sorted_sql(SortField::Favorites);
        assert!(
            sql.contains(r#"ORDER BY "recipes"."favorites_count" DESC"#),
            "{sql}"
        );

        let sql = sorted_sql(SortField::Recency);
        assert!(
            sql.contains(r#"ORDER BY "recipes"."created_at" DESC"#),
            "{sql}"
        );
    }

    #[test]
    fn test_every_sort_breaks_ties_by_id() {
        for sort in [SortField::PrepTime, SortField::Favorites, SortField::Recency] {
            let sql = sorted_sql(sort);
            assert!(sql.contains(r#""recipes"."id" DESC"#), "{sql}");
        }
    }

    #[test]
    fn test_params_accept_camel_case_keys() {
        let params: SearchParams = serde_json::from_value(serde_json::json!({
            "searchText": "pasta",
            "dietaryPreference": "Vegan",
            "maxPrepTime": 30,
            "sortBy": "favorites",
            "page": 2,
            "limit": 20
        }))
        .unwrap();

        assert_eq!(params.search_text.as_deref(), Some("pasta"));
        assert_eq!(params.dietary_preference.as_deref(), Some("Vegan"));
        assert_eq!(params.max_prep_time, Some(30));
        assert_eq!(params.sort_by.as_deref(), Some("favorites"));
        assert_eq!(params.page, Some(2));
        assert_eq!(params.limit, Some(20));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = SearchResponse {
            recipes: vec![SearchResult {
                id: Uuid::nil(),
                title: "Dal".to_string(),
                image: None,
                cuisine: Some("Indian".to_string()),
                prep_time: Some(40),
                ingredient_names: vec!["lentils".to_string()],
                dietary_preferences: vec!["Vegan".to_string()],
                favorites_count: 3,
                author_name: Some("priya".to_string()),
            }],
            total_count: 1,
            current_page: 0,
            total_pages: 1,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("totalCount").is_some());
        assert!(value.get("currentPage").is_some());
        assert!(value.get("totalPages").is_some());

        let row = &value["recipes"][0];
        assert!(row.get("prepTime").is_some());
        assert!(row.get("ingredientNames").is_some());
        assert!(row.get("dietaryPreferences").is_some());
        assert!(row.get("favoritesCount").is_some());
        assert!(row.get("authorName").is_some());
        assert!(row.get("steps").is_none());
    }
}
