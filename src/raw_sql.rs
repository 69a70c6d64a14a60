//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! All SQL in this module has been reviewed for SQL injection safety:
//! - User input is ALWAYS passed via `.bind()` parameters
//! - No string concatenation or interpolation with user data
//!
//! When adding new SQL here:
//! 1. Document why Diesel DSL can't be used
//! 2. Ensure all user input uses `.bind()`

/// Escapes `\`, `%`, and `_` so user input matches literally inside a
/// LIKE/ILIKE pattern. Postgres treats backslash as the escape character
/// by default, so it has to be escaped first.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Filter expression matching an ILIKE pattern against each element of
/// `recipes.ingredient_names`.
///
/// Expands the array with `unnest()` and checks whether any element
/// matches the bound pattern.
///
/// # Safety
/// The pattern is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel has no DSL for per-element pattern matching over a Postgres
/// array.
#[macro_export]
macro_rules! ingredient_name_ilike {
    ($pattern:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "EXISTS (SELECT 1 FROM unnest(recipes.ingredient_names) AS ingredient WHERE ingredient ILIKE ",
        )
        .bind::<diesel::sql_types::Text, _>($pattern)
        .sql(")")
    };
}

/// Filter expression for exact membership in `recipes.dietary_preferences`.
///
/// # Safety
/// The preference value is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel's `PgArrayExpressionMethods` can't put a bound scalar on the
/// left-hand side of `= ANY`.
#[macro_export]
macro_rules! dietary_preference_eq_any {
    ($preference:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("(")
            .bind::<diesel::sql_types::Text, _>($preference)
            .sql(" = ANY(recipes.dietary_preferences))")
    };
}

/// Filter expression matching an ILIKE pattern against each element of
/// `recipes.dietary_preferences`.
///
/// # Safety
/// The pattern is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Same `unnest()` workaround as [`ingredient_name_ilike`]; Diesel can't
/// pattern-match over array elements.
#[macro_export]
macro_rules! dietary_preference_ilike {
    ($pattern:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>(
            "EXISTS (SELECT 1 FROM unnest(recipes.dietary_preferences) AS preference WHERE preference ILIKE ",
        )
        .bind::<diesel::sql_types::Text, _>($pattern)
        .sql(")")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_leaves_plain_text_alone() {
        assert_eq!(escape_like("chicken soup"), "chicken soup");
    }

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_whole"), "100\\%\\_whole");
    }

    #[test]
    fn test_escape_like_escapes_backslash_first() {
        assert_eq!(escape_like("a\\%b"), "a\\\\\\%b");
    }
}
