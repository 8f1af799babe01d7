pub mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/recipes/:id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route("/comments/:id", delete(handlers::delete_comment))
}
