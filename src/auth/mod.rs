pub mod dto;
pub mod guards;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod session;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/profile", get(handlers::profile))
        .route("/edit-profile", post(handlers::edit_profile))
}
