use axum::{
    body::Bytes,
    extract::{ws::WebSocketUpgrade, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::app::AppState;
use crate::config::SourceMap;
use crate::push;

pub const STATIC_DIR: &str = "public";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/trends", get(all_trends))
        .route("/api/trends/{category}", get(category_trends))
        .route("/api/scrape", post(scrape_now))
        .route("/api/web3/status", get(web3_status))
        .route("/ws", get(ws_upgrade))
        .fallback_service(ServeDir::new(STATIC_DIR))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn all_trends(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.get_all().as_ref().clone())
}

async fn category_trends(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Response {
    match state.store.get_one(&category) {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeReq {
    #[serde(default)]
    sources: Option<SourceMap>,
}

/// Body is optional; an empty or missing `sources` scrapes the configured map.
async fn scrape_now(State(state): State<AppState>, body: Bytes) -> Response {
    let req: ScrapeReq = if body.iter().all(u8::is_ascii_whitespace) {
        ScrapeReq::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("invalid body: {e}") })),
                )
                    .into_response()
            }
        }
    };
    let sources = req.sources.filter(|s| !s.is_empty());

    // Panics inside the cycle surface as 500 instead of a dropped connection.
    let worker = state.clone();
    let cycle = tokio::spawn(async move { worker.run_cycle(sources.as_ref()).await });
    match cycle.await {
        Ok(analyzed) => Json(json!({ "ok": true, "analyzed": analyzed.as_ref() })).into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "manual scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn web3_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.chain.status().await)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.push.clone();
    ws.on_upgrade(move |socket| push::serve_socket(socket, hub))
}
