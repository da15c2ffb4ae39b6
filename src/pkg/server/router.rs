use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use axum::routing::post;
use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::handlers::probes::{healthz, home, livez, not_found};
use super::state::AppState;

pub fn build_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    Router::new()
        .route("/", get(home))
        .route("/jobs", get(handlers::jobs::list))
        .route("/jobs", post(handlers::jobs::create))
        .route("/jobsbyids", post(handlers::jobs::by_ids))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(cors)
        .with_state(state)
}
