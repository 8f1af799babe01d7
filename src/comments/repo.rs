use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// Comment joined with the commenter's username and avatar so the view needs
/// no extra lookups.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub username: String,
    pub profile_image: String,
}

pub async fn list_by_recipe(db: &PgPool, recipe_id: Uuid) -> Result<Vec<Comment>, AppError> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT c.id, c.recipe_id, c.user_id, c.content, c.created_at,
               u.username, u.profile_image
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.recipe_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(comments)
}

/// Inserts a comment. Content is expected non-empty after trimming; the
/// caller enforces that before invoking.
pub async fn create(
    db: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Uuid, AppError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO comments (recipe_id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Deletes the comment only when it belongs to `user_id`; `false` means not
/// found or not owned.
pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
