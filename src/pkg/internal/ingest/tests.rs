//! Unit tests for bulk ingestion.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use super::*;
use crate::pkg::internal::adaptors::jobs::{
    memory::MemoryJobStore,
    spec::{JobEntry, JobType},
};
use crate::pkg::internal::catalog::{SortOrder, filter::Filter};
use crate::prelude::Error;

fn posting(title: &str, url: &str) -> Value {
    json!({
        "job_title": title,
        "apply_url": url,
        "job_description": "Build APIs",
        "skills": ["Rust"],
        "work_mode": "Remote"
    })
}

/// Hides existing rows from the dedup check, the way a concurrent request
/// that commits between check and insert would.
struct RacingStore {
    inner: MemoryJobStore,
}

#[async_trait]
impl JobStore for RacingStore {
    async fn find(&self, filter: &Filter, sort: SortOrder, skip: i64, limit: i64) -> Result<Vec<JobEntry>> {
        self.inner.find(filter, sort, skip, limit).await
    }

    async fn count(&self, filter: &Filter) -> Result<i64> {
        self.inner.count(filter).await
    }

    async fn existing_urls(&self, _urls: &[String]) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    async fn insert_many(&self, jobs: Vec<NewJob>) -> Result<Vec<String>> {
        self.inner.insert_many(jobs).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<JobEntry>> {
        self.inner.find_by_ids(ids).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.inner.purge_expired(cutoff).await
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Fails any insert that carries the poisoned url, the way one bad row fails
/// a whole multi-row statement.
struct PoisonedStore {
    inner: MemoryJobStore,
    poisoned: String,
    calls: AtomicUsize,
}

impl PoisonedStore {
    fn new(poisoned: &str) -> Self {
        PoisonedStore {
            inner: MemoryJobStore::new(),
            poisoned: poisoned.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl JobStore for PoisonedStore {
    async fn find(&self, filter: &Filter, sort: SortOrder, skip: i64, limit: i64) -> Result<Vec<JobEntry>> {
        self.inner.find(filter, sort, skip, limit).await
    }

    async fn count(&self, filter: &Filter) -> Result<i64> {
        self.inner.count(filter).await
    }

    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>> {
        self.inner.existing_urls(urls).await
    }

    async fn insert_many(&self, jobs: Vec<NewJob>) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if jobs.iter().any(|j| j.apply_url == self.poisoned) {
            return Err(Error::Db(sqlx::Error::Protocol("invalid byte sequence".into())));
        }
        self.inner.insert_many(jobs).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<JobEntry>> {
        self.inner.find_by_ids(ids).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.inner.purge_expired(cutoff).await
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_single_object_is_wrapped() {
    let store = MemoryJobStore::new();
    let report = ingest(&store, posting("Engineer", "https://jobs.example.com/1"), 500)
        .await
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 0);
    assert!(report.duplicates.is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_same_job_twice_across_requests() {
    let store = MemoryJobStore::new();
    let job = posting("Engineer", "https://jobs.example.com/1");

    let first = ingest(&store, json!([job.clone()]), 500).await.unwrap();
    assert_eq!(first.added, 1);

    let second = ingest(&store, json!([job]), 500).await.unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.duplicates, vec!["https://jobs.example.com/1".to_string()]);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_duplicate_within_payload_inserted_once() {
    let store = MemoryJobStore::new();
    let payload = json!([
        posting("Engineer", "https://jobs.example.com/dup"),
        posting("Engineer (copy)", "https://jobs.example.com/dup"),
        posting("Designer", "https://jobs.example.com/new"),
    ]);
    let report = ingest(&store, payload, 500).await.unwrap();
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].index, 1);
    assert_eq!(store.len(), 2);

    let titles: Vec<String> = store
        .find(&Filter::all(), SortOrder::Oldest, 0, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.job_title)
        .collect();
    assert_eq!(titles, vec!["Engineer".to_string(), "Designer".to_string()]);
}

#[tokio::test]
async fn test_invalid_records_never_inserted() {
    let store = MemoryJobStore::new();
    let payload = json!([
        {"apply_url": "https://jobs.example.com/no-title", "skills": ["rust"]},
        {"job_title": "Engineer", "apply_url": "ftp://jobs.example.com/ftp"},
        {"job_title": "   ", "apply_url": "https://jobs.example.com/blank"},
        "not a job",
        posting("Engineer", "https://jobs.example.com/ok"),
    ]);
    let report = ingest(&store, payload, 500).await.unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 4);
    assert_eq!(
        report.rejected.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3]
    );
    assert_eq!(
        report.rejected[1].apply_url.as_deref(),
        Some("ftp://jobs.example.com/ftp")
    );
    let stored = store
        .existing_urls(&[
            "https://jobs.example.com/no-title".into(),
            "ftp://jobs.example.com/ftp".into(),
            "https://jobs.example.com/blank".into(),
            "https://jobs.example.com/ok".into(),
        ])
        .await
        .unwrap();
    assert_eq!(stored, HashSet::from(["https://jobs.example.com/ok".to_string()]));
}

#[tokio::test]
async fn test_stored_values_are_sanitized() {
    let store = MemoryJobStore::new();
    ingest(
        &store,
        json!({
            "job_title": "  Platform Engineer  ",
            "apply_url": " https://jobs.example.com/1 ",
            "skills": ["  Kubernetes ", "GO"],
            "work_mode": " HYBRID ",
            "job_type": "Full Time",
            "experience": "3-5 years"
        }),
        500,
    )
    .await
    .unwrap();
    let job = &store.find(&Filter::all(), SortOrder::Latest, 0, 1).await.unwrap()[0];
    assert_eq!(job.job_title, "Platform Engineer");
    assert_eq!(job.apply_url, "https://jobs.example.com/1");
    assert_eq!(job.skills, vec!["kubernetes".to_string(), "go".to_string()]);
    assert_eq!(job.work_mode.map(|m| m.as_str()), Some("hybrid"));
    assert_eq!(job.job_type, Some(JobType::FullTime));
    assert_eq!(job.experience_min_years, Some(3));
}

#[tokio::test]
async fn test_insert_race_is_reported_as_duplicate() {
    let store = RacingStore {
        inner: MemoryJobStore::new(),
    };
    store
        .insert_many(vec![validate(posting("Engineer", "https://jobs.example.com/raced")).unwrap()])
        .await
        .unwrap();

    let payload = json!([
        posting("Engineer", "https://jobs.example.com/raced"),
        posting("Designer", "https://jobs.example.com/fresh"),
    ]);
    let report = ingest(&store, payload, 500).await.unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.duplicates, vec!["https://jobs.example.com/raced".to_string()]);
    assert_eq!(store.inner.len(), 2);
}

#[tokio::test]
async fn test_failed_record_does_not_abort_others() {
    let store = PoisonedStore::new("https://jobs.example.com/2");
    let payload = Value::Array(
        (0..5)
            .map(|i| posting("Engineer", &format!("https://jobs.example.com/{}", i)))
            .collect(),
    );
    let report = ingest(&store, payload, 500).await.unwrap();
    assert_eq!(report.added, 4);
    assert_eq!(report.skipped, 1);
    assert!(report.duplicates.is_empty());
    assert_eq!(store.inner.len(), 4);
    // one failed batch, then each record on its own
    assert_eq!(store.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_failed_chunk_only_retries_itself() {
    let store = PoisonedStore::new("https://jobs.example.com/3");
    let payload = Value::Array(
        (0..5)
            .map(|i| posting("Engineer", &format!("https://jobs.example.com/{}", i)))
            .collect(),
    );
    // chunks of 2: [0,1] ok, [2,3] fails then 2 alone ok and 3 alone fails, [4] ok
    let report = ingest(&store, payload, 2).await.unwrap();
    assert_eq!(report.added, 4);
    assert_eq!(report.skipped, 1);
    assert_eq!(store.calls.load(Ordering::SeqCst), 5);
    let stored = store
        .existing_urls(&["https://jobs.example.com/3".into()])
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_empty_payload() {
    let store = MemoryJobStore::new();
    let report = ingest(&store, json!([]), 500).await.unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped, 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_nul_bytes_are_stripped_before_storage() {
    let store = MemoryJobStore::new();
    let report = ingest(
        &store,
        json!({
            "job_title": "Engi\u{0000}neer",
            "apply_url": "https://jobs.example.com/nul",
            "job_description": "a\u{0000}b"
        }),
        500,
    )
    .await
    .unwrap();
    assert_eq!(report.added, 1);
    let job = &store.find(&Filter::all(), SortOrder::Latest, 0, 1).await.unwrap()[0];
    assert_eq!(job.job_title, "Engineer");
    assert_eq!(job.job_description.as_deref(), Some("ab"));
}
