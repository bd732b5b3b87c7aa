//! Auth API module

mod handler;

use axum::routing::post;
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/auth/signup", post(handler::sign_up))
        .route("/auth/signin", post(handler::sign_in))
}
