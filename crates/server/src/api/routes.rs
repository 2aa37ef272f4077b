use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, intake, middleware::metrics_middleware, requesters, sweep};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Ticket intake
        .route(
            "/tickets",
            post(intake::submit_ticket).options(intake::preflight),
        )
        // Requester records
        .route("/requesters/{email}", get(requesters::get_requester))
        // Staleness sweep
        .route("/sweep", post(sweep::trigger_sweep))
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
