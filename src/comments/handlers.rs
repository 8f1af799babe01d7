use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::guards::ApiUser,
    comments::{
        dto::{CommentForm, CreatedComment},
        repo::{self, Comment},
    },
    error::AppError,
    outcome::{Deleted, Envelope, FormOutcome},
    state::AppState,
    validation::FieldErrors,
};

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<Comment>>>, AppError> {
    let comments = repo::list_by_recipe(&state.db, recipe_id).await?;
    Ok(Envelope::success(comments))
}

#[instrument(skip(state, form))]
pub async fn create_comment(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
    Path(recipe_id): Path<Uuid>,
    Json(form): Json<CommentForm>,
) -> Result<FormOutcome<CreatedComment, CommentForm>, AppError> {
    let content = form.content.trim().to_string();
    if content.is_empty() {
        return Ok(FormOutcome::rejected(
            form,
            FieldErrors::single("content", "Comment cannot be empty"),
        ));
    }

    match repo::create(&state.db, recipe_id, user_id, &content).await {
        Ok(id) => {
            info!(comment_id = %id, recipe_id = %recipe_id, user_id = %user_id, "comment created");
            Ok(FormOutcome::Created(CreatedComment { id }))
        }
        // The recipe the comment points at is gone.
        Err(AppError::InvalidReference) => Ok(FormOutcome::Missing("Recipe not found")),
        Err(e) => Err(e),
    }
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    ApiUser(user_id): ApiUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Deleted>>, AppError> {
    if !repo::delete(&state.db, id, user_id).await? {
        return Err(AppError::NotFound("Comment not found"));
    }
    info!(comment_id = %id, user_id = %user_id, "comment deleted");
    Ok(Envelope::success(Deleted { deleted: true }))
}
