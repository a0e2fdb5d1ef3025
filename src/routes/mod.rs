//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - session, quest and analysis endpoints used by the IDE extension
/// - quest administration under `/admin/quests`
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Service
        .route("/", get(http::http_root))
        .route("/health", get(http::http_health))
        .route("/get-user-id/:email", get(http::http_get_user_id))
        // Sessions
        .route("/session/start", post(http::http_session_start))
        .route("/session/:id/update", put(http::http_session_update))
        .route("/session/:id/end", post(http::http_session_end))
        .route("/session/:id/analysis", get(http::http_session_analysis))
        // Quests + submissions
        .route("/get-quest/:skill_level", get(http::http_get_quest))
        .route("/get-quest-languages", get(http::http_get_quest_languages))
        .route("/analyze", post(http::http_post_analyze))
        // Admin
        .route("/admin/quests", post(http::http_add_quest))
        .route("/admin/quests/reload", post(http::http_reload_quests))
        .route("/admin/quests/:id", delete(http::http_remove_quest))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
