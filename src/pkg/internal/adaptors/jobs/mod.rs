pub mod memory;
pub mod mutators;
pub mod selectors;
pub mod spec;

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::pkg::internal::catalog::{SortOrder, filter::Filter};
use crate::prelude::Result;
use mutators::JobMutator;
use selectors::JobSelector;
use spec::{JobEntry, NewJob};

/// The document store the catalog runs against.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find(&self, filter: &Filter, sort: SortOrder, skip: i64, limit: i64) -> Result<Vec<JobEntry>>;

    async fn count(&self, filter: &Filter) -> Result<i64>;

    /// Subset of `urls` already stored.
    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>>;

    /// Inserts without ordering guarantees. A url that is already taken is
    /// skipped rather than failing the batch. Returns the urls written.
    async fn insert_many(&self, jobs: Vec<NewJob>) -> Result<Vec<String>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<JobEntry>>;

    /// Removes jobs created before `cutoff`, returning how many went.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

pub struct PgJobStore {
    pool: Arc<PgPool>,
}

impl PgJobStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgJobStore { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn find(&self, filter: &Filter, sort: SortOrder, skip: i64, limit: i64) -> Result<Vec<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        let rows = JobSelector::new(&mut *conn).find(filter, sort, skip, limit).await?;
        Ok(rows)
    }

    async fn count(&self, filter: &Filter) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        let total = JobSelector::new(&mut *conn).count(filter).await?;
        Ok(total)
    }

    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>> {
        let mut conn = self.pool.acquire().await?;
        let existing = JobSelector::new(&mut *conn).existing_urls(urls).await?;
        Ok(existing)
    }

    async fn insert_many(&self, jobs: Vec<NewJob>) -> Result<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        let inserted = JobMutator::new(&mut *conn).create_many(jobs).await?;
        Ok(inserted)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        let rows = JobSelector::new(&mut *conn).get_by_ids(ids).await?;
        Ok(rows)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        let removed = JobMutator::new(&mut *conn).delete_created_before(cutoff).await?;
        Ok(removed)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("select 1").execute(&*self.pool).await?;
        Ok(())
    }
}
