//! Request-pipeline capability checks. All three guards share the same token
//! lookup (bearer header, then session cookie) and differ only in how a
//! failure is answered: JSON 401 for machine clients, redirects for pages.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
    response::Redirect,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::session::SessionKeys;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session";

/// Authenticated machine client; rejects with a structured 401.
pub struct ApiUser(pub Uuid);

/// Authenticated page visitor; rejects by redirecting to the login page.
pub struct PageUser(pub Uuid);

/// Passes only when no valid session is attached; keeps logged-in users off
/// the login and registration entry points.
#[derive(Debug)]
pub struct Guest;

fn session_token(parts: &Parts) -> Option<String> {
    if let Some(header_value) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = header_value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn verified_user<S>(parts: &Parts, state: &S) -> Option<Uuid>
where
    SessionKeys: FromRef<S>,
{
    let token = session_token(parts)?;
    let keys = SessionKeys::from_ref(state);
    keys.verify(&token).ok().map(|claims| claims.sub)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ApiUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match verified_user(parts, state) {
            Some(user_id) => Ok(ApiUser(user_id)),
            None => {
                warn!("unauthenticated api request");
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for PageUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        verified_user(parts, state)
            .map(PageUser)
            .ok_or_else(|| Redirect::to("/users/login"))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Guest
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match verified_user(parts, state) {
            Some(_) => Err(Redirect::to("/")),
            None => Ok(Guest),
        }
    }
}

pub fn session_cookie(token: &str, max_age: std::time::Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header_name: header::HeaderName, value: &str) -> Parts {
        Request::builder()
            .uri("/")
            .header(header_name, value)
            .body(())
            .expect("request")
            .into_parts()
            .0
    }

    #[test]
    fn token_from_bearer_header() {
        let parts = parts_with(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(session_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn token_from_session_cookie() {
        let parts = parts_with(header::COOKIE, "theme=dark; session=tok123; lang=en");
        assert_eq!(session_token(&parts).as_deref(), Some("tok123"));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut parts = parts_with(header::AUTHORIZATION, "Bearer from-header");
        parts
            .headers
            .insert(header::COOKIE, "session=from-cookie".parse().expect("value"));
        assert_eq!(session_token(&parts).as_deref(), Some("from-header"));
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        let parts = Request::builder()
            .uri("/")
            .body(())
            .expect("request")
            .into_parts()
            .0;
        assert!(session_token(&parts).is_none());

        let parts = parts_with(header::COOKIE, "session=");
        assert!(session_token(&parts).is_none());

        let parts = parts_with(header::AUTHORIZATION, "Basic dXNlcg==");
        assert!(session_token(&parts).is_none());
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
