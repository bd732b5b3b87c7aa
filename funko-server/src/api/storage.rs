//! Stored Image Retrieval

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/storage/{name}", get(get_image))
}

/// GET /storage/{name} - raw image bytes with guessed content type
async fn get_image(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let (bytes, mime) = state.images.load(&name).await?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
