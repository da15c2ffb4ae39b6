use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode, Uri},
};
use serde_json::{Value, json};

use crate::{pkg::server::state::AppState, prelude::Result};

pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Job Listing API is live!",
        "endpoints": ["/jobs (GET, POST)", "/jobsbyids (POST)"],
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn livez() -> Result<()> {
    tracing::debug!("service is live");
    Ok(())
}

pub async fn healthz(State(state): State<AppState>) -> Result<()> {
    state.store.ping().await?;
    tracing::debug!("service is healthy");
    Ok(())
}

pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Route {} {} not found", method, uri.path()) })),
    )
}
