use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

pub const DEFAULT_RECIPE_IMAGE: &str = "images/default/default-recipe.jpg";

/// Recipe row joined with the owner's public profile fields and the derived
/// rating aggregates. `avg_rating` is `None` until the first rating lands.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub category: String,
    pub image: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub username: String,
    pub profile_image: String,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RatingStats {
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub category: String,
    pub image: Option<String>,
    pub owner_id: Uuid,
}

/// Allow-listed fields for partial update; anything else in a request body
/// never reaches the SQL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.prep_time.is_none()
            && self.cook_time.is_none()
            && self.servings.is_none()
            && self.category.is_none()
            && self.image.is_none()
    }
}

/// Sort keys accepted by [`list`]. Parsing falls back to `CreatedAt` for any
/// unrecognized input, so raw query strings never steer the SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreatedAt,
    AvgRating,
    Title,
}

impl SortBy {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "avg_rating" => SortBy::AvgRating,
            "title" => SortBy::Title,
            _ => SortBy::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "r.created_at",
            SortBy::AvgRating => "avg_rating",
            SortBy::Title => "r.title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortBy,
    pub order: SortOrder,
    pub limit: Option<i64>,
    pub offset: i64,
}

const RECIPE_COLUMNS: &str = "r.id, r.title, r.description, r.ingredients, r.instructions, \
     r.prep_time, r.cook_time, r.servings, r.category, r.image, \
     r.user_id, r.created_at, r.updated_at, u.username, u.profile_image, \
     (SELECT AVG(rating)::float8 FROM ratings WHERE recipe_id = r.id) AS avg_rating, \
     (SELECT COUNT(*) FROM ratings WHERE recipe_id = r.id) AS rating_count";

/// Composes the filtered listing: WHERE category, AND search, ORDER BY,
/// LIMIT/OFFSET. Separated from [`list`] so the composition is testable
/// without a database.
fn list_query(filter: &RecipeFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r JOIN users u ON r.user_id = u.id"
    ));

    if let Some(category) = &filter.category {
        qb.push(" WHERE r.category = ").push_bind(category.clone());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(if filter.category.is_some() {
            " AND"
        } else {
            " WHERE"
        });
        qb.push(" (r.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.ingredients ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY ").push(filter.sort.column());
    match (filter.sort, filter.order) {
        // Unrated recipes (NULL average) lead under ascending, trail otherwise.
        (SortBy::AvgRating, SortOrder::Asc) => qb.push(" ASC NULLS FIRST"),
        (SortBy::AvgRating, SortOrder::Desc) => qb.push(" DESC NULLS LAST"),
        (_, SortOrder::Asc) => qb.push(" ASC"),
        (_, SortOrder::Desc) => qb.push(" DESC"),
    };

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);
    }

    qb
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Recipe>, AppError> {
    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r JOIN users u ON r.user_id = u.id WHERE r.id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(recipe)
}

/// Filtered, sorted, paginated listing. An empty match is an empty vec.
pub async fn list(db: &PgPool, filter: &RecipeFilter) -> Result<Vec<Recipe>, AppError> {
    let rows = list_query(filter)
        .build_query_as::<Recipe>()
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Inserts a recipe, defaulting the image to the shared placeholder.
pub async fn create(db: &PgPool, new: &NewRecipe) -> Result<Uuid, AppError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO recipes
            (title, description, ingredients, instructions,
             prep_time, cook_time, servings, category, image, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.ingredients)
    .bind(&new.instructions)
    .bind(new.prep_time)
    .bind(new.cook_time)
    .bind(new.servings)
    .bind(&new.category)
    .bind(new.image.as_deref().unwrap_or(DEFAULT_RECIPE_IMAGE))
    .bind(new.owner_id)
    .fetch_one(db)
    .await?;
    Ok(id)
}

fn update_query(
    id: Uuid,
    owner_id: Uuid,
    patch: &RecipePatch,
) -> Option<QueryBuilder<'static, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("UPDATE recipes SET ");
    let mut fields = qb.separated(", ");
    if let Some(title) = &patch.title {
        fields.push("title = ").push_bind_unseparated(title.clone());
    }
    if let Some(description) = &patch.description {
        fields
            .push("description = ")
            .push_bind_unseparated(description.clone());
    }
    if let Some(ingredients) = &patch.ingredients {
        fields
            .push("ingredients = ")
            .push_bind_unseparated(ingredients.clone());
    }
    if let Some(instructions) = &patch.instructions {
        fields
            .push("instructions = ")
            .push_bind_unseparated(instructions.clone());
    }
    if let Some(prep_time) = patch.prep_time {
        fields.push("prep_time = ").push_bind_unseparated(prep_time);
    }
    if let Some(cook_time) = patch.cook_time {
        fields.push("cook_time = ").push_bind_unseparated(cook_time);
    }
    if let Some(servings) = patch.servings {
        fields.push("servings = ").push_bind_unseparated(servings);
    }
    if let Some(category) = &patch.category {
        fields
            .push("category = ")
            .push_bind_unseparated(category.clone());
    }
    if let Some(image) = &patch.image {
        fields.push("image = ").push_bind_unseparated(image.clone());
    }
    fields.push("updated_at = now()");

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(owner_id);
    Some(qb)
}

/// Applies the patch to the recipe only when it belongs to `owner_id`; the
/// WHERE clause itself carries the ownership check, so a non-owner's attempt
/// affects zero rows. Returns `false` for an empty patch or when no row
/// matched; the two cases are deliberately indistinguishable.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    patch: &RecipePatch,
) -> Result<bool, AppError> {
    let Some(mut qb) = update_query(id, owner_id, patch) else {
        return Ok(false);
    };
    let result = qb.build().execute(db).await?;
    Ok(result.rows_affected() > 0)
}

/// Ownership-scoped hard delete; `false` means not found or not owned.
pub async fn delete(db: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn distinct_categories(db: &PgPool) -> Result<Vec<String>, AppError> {
    let categories =
        sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM recipes ORDER BY category")
            .fetch_all(db)
            .await?;
    Ok(categories)
}

/// Every recipe authored by `owner_id`, newest first, with derived stats.
pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> Result<Vec<Recipe>, AppError> {
    let rows = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r JOIN users u ON r.user_id = u.id \
         WHERE r.user_id = $1 ORDER BY r.created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Records `user_id`'s rating of the recipe, overwriting any previous one.
/// A single INSERT .. ON CONFLICT keeps concurrent re-ratings atomic; the
/// unique constraint on (recipe_id, user_id) is the backstop.
pub async fn upsert_rating(
    db: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    rating: i32,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO ratings (recipe_id, user_id, rating)
        VALUES ($1, $2, $3)
        ON CONFLICT (recipe_id, user_id) DO UPDATE SET rating = EXCLUDED.rating
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(rating)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn rating_stats(db: &PgPool, recipe_id: Uuid) -> Result<RatingStats, AppError> {
    let stats = sqlx::query_as::<_, RatingStats>(
        r#"
        SELECT AVG(rating)::float8 AS avg_rating, COUNT(*) AS rating_count
        FROM ratings
        WHERE recipe_id = $1
        "#,
    )
    .bind(recipe_id)
    .fetch_one(db)
    .await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_filter_sorts_newest_first_without_where_or_limit() {
        let qb = list_query(&RecipeFilter::default());
        let sql = qb.sql();
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.ends_with("ORDER BY r.created_at DESC"));
    }

    #[test]
    fn unknown_sort_behaves_like_omitted_sort() {
        let fallback = RecipeFilter {
            sort: SortBy::parse("drop table"),
            ..RecipeFilter::default()
        };
        let omitted = RecipeFilter::default();
        assert_eq!(list_query(&fallback).sql(), list_query(&omitted).sql());
        assert!(!list_query(&fallback).sql().contains("drop table"));
    }

    #[test]
    fn category_and_search_compose_in_order() {
        let filter = RecipeFilter {
            category: Some("Desserts".into()),
            search: Some("chocolate".into()),
            ..RecipeFilter::default()
        };
        let qb = list_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("WHERE r.category = $1"));
        assert!(sql.contains("AND (r.title ILIKE $2 OR r.ingredients ILIKE $3)"));
    }

    #[test]
    fn search_alone_opens_the_where_clause() {
        let filter = RecipeFilter {
            search: Some("basil".into()),
            ..RecipeFilter::default()
        };
        let sql_owner = list_query(&filter);
        let sql = sql_owner.sql();
        assert!(sql.contains("WHERE (r.title ILIKE $1 OR r.ingredients ILIKE $2)"));
    }

    #[test]
    fn ascending_average_rating_puts_unrated_first() {
        let filter = RecipeFilter {
            category: Some("Desserts".into()),
            search: None,
            sort: SortBy::parse("avg_rating"),
            order: SortOrder::parse("asc"),
            limit: Some(2),
            offset: 0,
        };
        let qb = list_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY avg_rating ASC NULLS FIRST"));
        assert!(sql.contains("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn descending_average_rating_puts_unrated_last() {
        let filter = RecipeFilter {
            sort: SortBy::AvgRating,
            ..RecipeFilter::default()
        };
        let qb = list_query(&filter);
        assert!(qb.sql().contains("ORDER BY avg_rating DESC NULLS LAST"));
    }

    #[test]
    fn sort_order_parse_defaults_to_desc() {
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Desc);
    }

    #[test]
    fn empty_patch_produces_no_query() {
        let id = Uuid::new_v4();
        assert!(update_query(id, id, &RecipePatch::default()).is_none());
    }

    #[test]
    fn patch_applies_only_supplied_fields_and_scopes_by_owner() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let patch = RecipePatch {
            title: Some("Better Pancakes".into()),
            servings: Some(6),
            ..RecipePatch::default()
        };
        let qb = update_query(id, owner, &patch).expect("non-empty patch");
        let sql = qb.sql();
        assert!(sql.contains("title = $1"));
        assert!(sql.contains("servings = $2"));
        assert!(sql.contains("updated_at = now()"));
        assert!(sql.contains("WHERE id = $3 AND user_id = $4"));
        assert!(!sql.contains("description"));
    }
}
