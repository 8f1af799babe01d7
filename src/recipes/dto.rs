use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipes::repo::{NewRecipe, RecipeFilter, SortBy, SortOrder};

/// Listing endpoints cap results at 10 per page unless the caller asks
/// otherwise; the repository itself applies no cap.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Raw query-string parameters for the recipe listing. Unknown `sort`/`order`
/// values silently fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRecipesQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListRecipesQuery {
    pub fn into_filter(self) -> RecipeFilter {
        RecipeFilter {
            category: self.category.filter(|c| !c.is_empty()),
            search: self.search.filter(|s| !s.is_empty()),
            sort: self.sort.as_deref().map(SortBy::parse).unwrap_or_default(),
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            limit: Some(self.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// Recipe submission. String fields default to empty and numeric fields to
/// absent so validation can report every problem in one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    #[serde(default)]
    pub category: String,
    pub image: Option<String>,
}

impl RecipeForm {
    /// Only valid once validation has passed; `None` if a numeric field is
    /// still missing.
    pub fn into_new_recipe(self, owner_id: Uuid) -> Option<NewRecipe> {
        Some(NewRecipe {
            title: self.title,
            description: self.description,
            ingredients: self.ingredients,
            instructions: self.instructions,
            prep_time: self.prep_time?,
            cook_time: self.cook_time?,
            servings: self.servings?,
            category: self.category,
            image: self.image,
            owner_id,
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RateRequest {
    pub rating: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CreatedRecipe {
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_defaults_to_ten_newest() {
        let filter = ListRecipesQuery::default().into_filter();
        assert_eq!(filter.limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.sort, SortBy::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
        assert!(filter.category.is_none());
    }

    #[test]
    fn blank_category_and_search_are_dropped() {
        let query = ListRecipesQuery {
            category: Some(String::new()),
            search: Some(String::new()),
            ..ListRecipesQuery::default()
        };
        let filter = query.into_filter();
        assert!(filter.category.is_none());
        assert!(filter.search.is_none());
    }

    #[test]
    fn invalid_sort_falls_back_to_created_at() {
        let query = ListRecipesQuery {
            sort: Some("popularity; DROP TABLE recipes".into()),
            order: Some("upwards".into()),
            ..ListRecipesQuery::default()
        };
        let filter = query.into_filter();
        assert_eq!(filter.sort, SortBy::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn form_converts_once_numeric_fields_are_present() {
        let form = RecipeForm {
            title: "Pancakes".into(),
            description: "Breakfast staple".into(),
            ingredients: "flour".into(),
            instructions: "cook".into(),
            prep_time: Some(10),
            cook_time: Some(15),
            servings: Some(4),
            category: "Breakfast".into(),
            image: None,
        };
        let owner = Uuid::new_v4();
        let new = form.into_new_recipe(owner).expect("complete form");
        assert_eq!(new.owner_id, owner);
        assert_eq!(new.prep_time, 10);
        assert!(new.image.is_none());

        let incomplete = RecipeForm::default();
        assert!(incomplete.into_new_recipe(owner).is_none());
    }
}
