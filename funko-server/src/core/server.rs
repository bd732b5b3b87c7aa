//! Router assembly and serving.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::core::ServerState;
use crate::notifications;
use crate::utils::AppError;

/// Assemble the full application router.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        .merge(api::categories::router())
        .merge(api::funkos::router())
        .merge(api::users::router())
        .merge(api::orders::router())
        .merge(api::storage::router())
        .route("/ws", get(notifications::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(state: ServerState) -> Result<(), AppError> {
    let addr = format!("0.0.0.0:{}", state.config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, environment = %state.config.environment, "Server listening");

    let router = build_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {e}")))
}
