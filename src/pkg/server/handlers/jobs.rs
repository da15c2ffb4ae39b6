use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    pkg::{
        internal::{
            adaptors::jobs::spec::JobEntry,
            catalog::{JobPage, ListParams, list_jobs},
            ingest::{IngestReport, ingest},
        },
        server::state::AppState,
    },
    prelude::Result,
};

/// `/jobsbyids` accepts either a bare array or `{ "ids": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum JobIdsInput {
    List(Vec<String>),
    Wrapped { ids: Vec<String> },
}

impl JobIdsInput {
    fn parsed(self) -> Vec<Uuid> {
        let raw = match self {
            JobIdsInput::List(ids) | JobIdsInput::Wrapped { ids } => ids,
        };
        raw.iter()
            .filter_map(|id| Uuid::parse_str(id.trim()).ok())
            .collect()
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<JobPage>> {
    let params = ListParams::from_pairs(pairs);
    let page = list_jobs(state.store.as_ref(), &params, &state.catalog).await?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<IngestReport>> {
    let report = ingest(state.store.as_ref(), payload, state.catalog.insert_batch_size).await?;
    Ok(Json(report))
}

pub async fn by_ids(
    State(state): State<AppState>,
    Json(input): Json<JobIdsInput>,
) -> Result<Json<Vec<JobEntry>>> {
    let ids = input.parsed();
    if ids.is_empty() {
        return Ok(Json(vec![]));
    }
    let jobs = state.store.find_by_ids(&ids).await?;
    Ok(Json(jobs))
}
