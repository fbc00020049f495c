use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, put},
    Router,
};
use shared::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// The router behind trailing-slash normalization, ready to serve
pub type App = NormalizePath<Router>;

/// Build the servable application. The path is normalized before routing,
/// so `/cache/k/` matches `/cache/{key}`.
pub fn build_app(state: AppState, config: &Config) -> App {
    NormalizePath::trim_trailing_slash(build_router(state, config))
}

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // PUT is the global clear; other methods treat `clear` as a key
        .route(
            "/cache/clear",
            put(handlers::clear_all)
                .get(handlers::get_clear_key)
                .post(handlers::put_clear_key)
                .delete(handlers::delete_clear_key),
        )
        // Cache operation routes
        .route(
            "/cache/{key}",
            get(handlers::get_value)
                .post(handlers::put_value)
                .delete(handlers::delete_value),
        )
        // Middleware
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
