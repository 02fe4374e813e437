use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, AppState};
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the API router with all routes and middleware.
///
/// `cors_origin` is the single browser origin allowed to call the API.
pub fn create_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .nest("/movies", movie_routes())
        .nest("/interactions", interaction_routes())
        .nest("/analytics", analytics_routes())
        .route("/recommendations", get(handlers::recommendations::recommend))
        .with_state(state)
        .layer(
            // Outermost first: the trace span needs the request id
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors_layer(cors_origin)),
        )
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/profile", get(handlers::auth::profile))
}

fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/discover", get(handlers::movies::discover))
        .route("/trending", get(handlers::movies::trending))
        .route("/tv/trending", get(handlers::movies::tv_trending))
        .route("/search", get(handlers::movies::search))
        .route("/genre/:genre_id", get(handlers::movies::by_genre))
        .route("/:id", get(handlers::movies::details))
        .route("/:id/similar", get(handlers::movies::similar))
        .route("/:id/watch-providers", get(handlers::movies::watch_providers))
}

fn interaction_routes() -> Router<AppState> {
    Router::new()
        .route("/rate", post(handlers::interactions::rate))
        .route("/ratings", get(handlers::interactions::ratings))
        .route(
            "/rating",
            get(handlers::interactions::rating).delete(handlers::interactions::delete_rating),
        )
        .route("/favorite", post(handlers::interactions::toggle_favorite))
        .route("/favorites", get(handlers::interactions::favorites))
        .route("/is-favorite", get(handlers::interactions::is_favorite))
        .route("/watch", post(handlers::interactions::watch))
        .route(
            "/history",
            get(handlers::interactions::history).delete(handlers::interactions::clear_history),
        )
}

fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::analytics::stats))
        .route("/genres", get(handlers::analytics::genres))
        .route("/ratings", get(handlers::analytics::ratings))
        .route("/trends", get(handlers::analytics::trends))
        .route("/insights", get(handlers::analytics::insights))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CORS origin, allowing none");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
