use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;

/// User shape safe to hand to any caller; the password hash never leaves the
/// repository except through [`find_by_email`].
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image: String,
    pub created_at: OffsetDateTime,
}

/// Full row including the password hash; only the authenticator should touch
/// this.
#[derive(Debug, Clone, FromRow)]
pub struct FullUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: String,
    pub created_at: OffsetDateTime,
}

impl From<FullUser> for PublicUser {
    fn from(user: FullUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_image: user.profile_image,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Plaintext; hashed before it reaches the database.
    pub password: String,
}

/// Allow-listed profile fields for partial update.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.profile_image.is_none()
    }
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<PublicUser>, AppError> {
    let user = sqlx::query_as::<_, PublicUser>(
        r#"
        SELECT id, username, email, profile_image, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<FullUser>, AppError> {
    let user = sqlx::query_as::<_, FullUser>(
        r#"
        SELECT id, username, email, password_hash, profile_image, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Inserts a new user with a hashed password. Duplicate username/email surface
/// as [`AppError::Conflict`] via the unique constraints.
pub async fn create(db: &PgPool, new: &NewUser) -> Result<PublicUser, AppError> {
    let password_hash = hash_password(&new.password)?;
    let user = sqlx::query_as::<_, PublicUser>(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, profile_image, created_at
        "#,
    )
    .bind(&new.username)
    .bind(&new.email)
    .bind(&password_hash)
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Looks up by email and verifies the password. Unknown email and wrong
/// password both come back as `None` so callers cannot tell which emails
/// exist. The hash is stripped from the returned user.
pub async fn authenticate(
    db: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<PublicUser>, AppError> {
    let Some(user) = find_by_email(db, email).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    Ok(Some(user.into()))
}

/// Applies the allow-listed fields of `patch` to the user row. Returns `false`
/// when the patch is empty or no row matched.
pub async fn update(db: &PgPool, id: Uuid, patch: &UserPatch) -> Result<bool, AppError> {
    if patch.is_empty() {
        return Ok(false);
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut fields = qb.separated(", ");
    if let Some(username) = &patch.username {
        fields.push("username = ").push_bind_unseparated(username);
    }
    if let Some(email) = &patch.email {
        fields.push("email = ").push_bind_unseparated(email);
    }
    if let Some(profile_image) = &patch.profile_image {
        fields
            .push("profile_image = ")
            .push_bind_unseparated(profile_image);
    }
    fields.push("updated_at = now()");
    qb.push(" WHERE id = ").push_bind(id);

    let result = qb.build().execute(db).await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        let patch = UserPatch {
            username: Some("alice".into()),
            ..UserPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn public_user_drops_the_hash() {
        let full = FullUser {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$...".into(),
            profile_image: "images/default/default-profile.jpg".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let public: PublicUser = full.clone().into();
        assert_eq!(public.id, full.id);
        let json = serde_json::to_string(&public).expect("serialize");
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
