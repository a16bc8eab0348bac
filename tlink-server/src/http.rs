use crate::signaling::{SignalingRelay, ws_handler};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub rooms: usize,
    pub connections: usize,
}

/// `/ws` speaks the signaling protocol, `/health` reports registry sizes.
pub fn router(relay: SignalingRelay) -> Router {
    // Browser clients are served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

async fn health(State(relay): State<SignalingRelay>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        rooms: relay.rooms().room_count(),
        connections: relay.connections().len(),
    })
}
