//! Axum router configuration with middleware.
//!
//! All routes live under `/api/`. Middleware: CORS and request tracing.

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let api_routes = Router::new()
        // Accounts
        .route("/auth/register", post(handlers::user::register))
        .route("/auth/login", post(handlers::user::login))
        .route("/auth/user", get(handlers::user::current_user))
        // Characters
        .route(
            "/characters",
            post(handlers::character::create_character).get(handlers::character::list_characters),
        )
        .route(
            "/characters/{id}",
            get(handlers::character::get_character).delete(handlers::character::delete_character),
        )
        .route(
            "/characters/{id}/state",
            put(handlers::character::update_character_state),
        )
        // Narrator
        .route("/chat", post(handlers::chat::stream_chat))
        .route("/ai/summarize", post(handlers::summarize::summarize));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `"*"` in the origin list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// GET /health - liveness probe (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
