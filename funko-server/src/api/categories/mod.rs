//! Category API module

mod handler;

use axum::routing::get;
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/categories", get(handler::list).post(handler::create))
        .route(
            "/categories/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
