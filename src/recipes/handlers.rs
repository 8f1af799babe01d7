use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::guards::ApiUser,
    error::AppError,
    outcome::{Deleted, Envelope, FormOutcome},
    recipes::{
        dto::{CreatedRecipe, ListRecipesQuery, RateRequest, RecipeForm},
        repo::{self, RatingStats, Recipe, RecipePatch},
    },
    state::AppState,
    validation::{validate_rating, validate_recipe, validate_recipe_patch},
};

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<Envelope<Vec<Recipe>>>, AppError> {
    let recipes = repo::list(&state.db, &query.into_filter()).await?;
    Ok(Envelope::success(recipes))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Recipe>>, AppError> {
    let recipe = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Recipe not found"))?;
    Ok(Envelope::success(recipe))
}

/// Plain string array, not the envelope.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let categories = repo::distinct_categories(&state.db).await?;
    Ok(Json(categories))
}

#[instrument(skip(state, form))]
pub async fn create_recipe(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
    Json(form): Json<RecipeForm>,
) -> Result<FormOutcome<CreatedRecipe, RecipeForm>, AppError> {
    let errors = validate_recipe(&form);
    if !errors.is_empty() {
        warn!(user_id = %user_id, error_count = errors.len(), "recipe rejected");
        return Ok(FormOutcome::rejected(form, errors));
    }
    let Some(new_recipe) = form.clone().into_new_recipe(user_id) else {
        return Ok(FormOutcome::rejected(form, errors));
    };

    let id = repo::create(&state.db, &new_recipe).await?;
    info!(recipe_id = %id, user_id = %user_id, "recipe created");
    Ok(FormOutcome::Created(CreatedRecipe { id }))
}

/// Ownership is enforced inside the repository's WHERE clause; a `false`
/// result answers 404 whether the recipe is missing or merely not theirs.
#[instrument(skip(state, patch))]
pub async fn update_recipe(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<RecipePatch>,
) -> Result<FormOutcome<Recipe, RecipePatch>, AppError> {
    let errors = validate_recipe_patch(&patch);
    if !errors.is_empty() {
        return Ok(FormOutcome::rejected(patch, errors));
    }

    if !repo::update(&state.db, id, user_id, &patch).await? {
        return Ok(FormOutcome::Missing("Recipe not found"));
    }

    info!(recipe_id = %id, user_id = %user_id, "recipe updated");
    let recipe = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("Recipe not found"))?;
    Ok(FormOutcome::Success(recipe))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Deleted>>, AppError> {
    if !repo::delete(&state.db, id, user_id).await? {
        return Err(AppError::NotFound("Recipe not found"));
    }
    info!(recipe_id = %id, user_id = %user_id, "recipe deleted");
    Ok(Envelope::success(Deleted { deleted: true }))
}

#[instrument(skip(state, body))]
pub async fn rate_recipe(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RateRequest>,
) -> Result<Json<Envelope<RatingStats>>, AppError> {
    let errors = validate_rating(body.rating);
    let Some(rating) = body.rating.filter(|_| errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };

    if repo::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Recipe not found"));
    }

    repo::upsert_rating(&state.db, id, user_id, rating).await?;
    info!(recipe_id = %id, user_id = %user_id, rating, "rating submitted");

    let stats = repo::rating_stats(&state.db, id).await?;
    Ok(Envelope::success(stats))
}

#[instrument(skip(state))]
pub async fn own_recipes(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
) -> Result<Json<Envelope<Vec<Recipe>>>, AppError> {
    let recipes = repo::list_by_owner(&state.db, user_id).await?;
    Ok(Envelope::success(recipes))
}
