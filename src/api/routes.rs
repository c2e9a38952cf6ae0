use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/items/search", get(handlers::search_items))
        .route("/items/:id", get(handlers::get_item))
        // Accounts
        .route("/accounts", post(handlers::create_account))
        .route("/accounts/import", post(handlers::import_profile))
        .route("/accounts/:username/profile", get(handlers::export_profile))
        .route("/accounts/:username/friends", post(handlers::add_friend))
        .route("/accounts/:username/reviews", post(handlers::add_review))
        .route(
            "/accounts/:username/preferences",
            put(handlers::update_preferences),
        )
        // Recommendations
        .route(
            "/accounts/:username/recommendations",
            get(handlers::recommend),
        )
        .route(
            "/accounts/:username/recommendations/friends",
            get(handlers::recommend_from_friends),
        )
        .route(
            "/accounts/:username/similarity/:id",
            get(handlers::explain_similarity),
        )
        // Request id runs first so the trace span can record it
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
