use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;

use config::Config;
use db::MoodStore;
use services::insights::InsightClient;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MoodStore>,
    pub config: Arc<Config>,
    pub insights: InsightClient,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(auth::middleware::AUTH_TOKEN_HEADER),
        ]);

    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins).allow_credentials(true)
}

/// The full HTTP surface, middleware included.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::health::service_info))
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        .route(
            "/api/moods",
            get(handlers::moods::list_moods).post(handlers::moods::create_mood),
        )
        .route(
            "/api/moods/:id",
            get(handlers::moods::get_mood)
                .put(handlers::moods::update_mood)
                .delete(handlers::moods::delete_mood),
        )
        .route("/api/insights", post(handlers::insights::generate_insight))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::map_response_with_state(
            state.clone(),
            error::expose_error_detail,
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
