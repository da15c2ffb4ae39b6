pub mod sanitize;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    pkg::internal::adaptors::jobs::{JobStore, mutators::MAX_ROWS_PER_INSERT, spec::NewJob},
    prelude::Result,
};
use sanitize::{sanitize, validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub index: usize,
    pub apply_url: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub added: usize,
    pub skipped: usize,
    pub duplicates: Vec<String>,
    pub rejected: Vec<Rejection>,
}

fn into_candidates(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn apply_url_of(candidate: &Value) -> Option<String> {
    candidate
        .get("apply_url")
        .and_then(Value::as_str)
        .map(String::from)
}

/// Counts what a chunk actually wrote; the rest lost an insert race.
fn record_inserted(report: &mut IngestReport, chunk: &[NewJob], inserted: &[String]) {
    report.added += inserted.len();
    if inserted.len() < chunk.len() {
        let written: HashSet<&String> = inserted.iter().collect();
        for job in chunk.iter().filter(|j| !written.contains(&j.apply_url)) {
            tracing::warn!("apply_url {} was stored concurrently, skipping", &job.apply_url);
            report.duplicates.push(job.apply_url.clone());
        }
    }
}

/// Merges a submitted batch into the store, inserting only postings whose
/// `apply_url` is not stored yet.
pub async fn ingest(store: &dyn JobStore, payload: Value, batch_size: usize) -> Result<IngestReport> {
    let candidates = into_candidates(payload);
    let received = candidates.len();
    let mut report = IngestReport::default();

    let mut seen = HashSet::new();
    let mut valid: Vec<NewJob> = Vec::with_capacity(received);
    for (index, raw) in candidates.into_iter().enumerate() {
        let clean = sanitize(raw);
        let apply_url = apply_url_of(&clean);
        match validate(clean) {
            Ok(job) => {
                if seen.insert(job.apply_url.clone()) {
                    valid.push(job);
                } else {
                    report.rejected.push(Rejection {
                        index,
                        apply_url,
                        reason: "duplicate apply_url within payload".to_string(),
                    });
                }
            }
            Err(reason) => report.rejected.push(Rejection {
                index,
                apply_url,
                reason,
            }),
        }
    }

    if !valid.is_empty() {
        let urls: Vec<String> = valid.iter().map(|j| j.apply_url.clone()).collect();
        let existing = store.existing_urls(&urls).await?;
        report.duplicates = urls.into_iter().filter(|u| existing.contains(u)).collect();

        let fresh: Vec<NewJob> = valid
            .into_iter()
            .filter(|j| !existing.contains(&j.apply_url))
            .collect();
        for chunk in fresh.chunks(batch_size.clamp(1, MAX_ROWS_PER_INSERT)) {
            match store.insert_many(chunk.to_vec()).await {
                Ok(inserted) => record_inserted(&mut report, chunk, &inserted),
                Err(e) if chunk.len() > 1 => {
                    tracing::warn!(
                        "batch of {} jobs failed ({}), retrying one by one",
                        chunk.len(),
                        e
                    );
                    for job in chunk {
                        match store.insert_many(vec![job.clone()]).await {
                            Ok(inserted) => {
                                record_inserted(&mut report, std::slice::from_ref(job), &inserted)
                            }
                            Err(e) => {
                                tracing::error!("failed to insert job {}: {}", &job.apply_url, e);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("failed to insert job {}: {}", &chunk[0].apply_url, e);
                }
            }
        }
    }

    report.skipped = received - report.added;
    tracing::info!(
        "ingested {} of {} jobs ({} duplicates, {} rejected)",
        report.added,
        received,
        report.duplicates.len(),
        report.rejected.len()
    );
    Ok(report)
}
