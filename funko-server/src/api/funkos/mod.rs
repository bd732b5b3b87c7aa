//! Funko API module

mod handler;

use axum::routing::{get, patch};
use axum::Router;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/funkos", get(handler::list).post(handler::create))
        .route(
            "/funkos/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/funkos/{id}/image", patch(handler::upload_image))
}
