//! Process-local job store for development runs and tests.

use std::{collections::HashSet, sync::RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    JobStore,
    spec::{JobEntry, NewJob},
};
use crate::pkg::internal::catalog::{SortOrder, experience, filter::Filter};
use crate::prelude::Result;

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<Vec<JobEntry>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with already materialised rows.
    #[cfg(test)]
    pub fn with_jobs(jobs: Vec<JobEntry>) -> Self {
        MemoryJobStore {
            jobs: RwLock::new(jobs),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.jobs.read().expect("jobs lock poisoned").len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, filter: &Filter) -> Vec<JobEntry> {
        let guard = self.jobs.read().expect("jobs lock poisoned");
        guard.iter().filter(|j| filter.matches(j)).cloned().collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn find(&self, filter: &Filter, sort: SortOrder, skip: i64, limit: i64) -> Result<Vec<JobEntry>> {
        let mut rows = self.matching(filter);
        // stable; reversed for Latest, so ties run last-inserted first like `id DESC`
        rows.sort_by_key(|j| j.created_at);
        if sort == SortOrder::Latest {
            rows.reverse();
        }
        Ok(rows
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &Filter) -> Result<i64> {
        let guard = self.jobs.read().expect("jobs lock poisoned");
        Ok(guard.iter().filter(|j| filter.matches(j)).count() as i64)
    }

    async fn existing_urls(&self, urls: &[String]) -> Result<HashSet<String>> {
        let wanted: HashSet<&str> = urls.iter().map(String::as_str).collect();
        let guard = self.jobs.read().expect("jobs lock poisoned");
        Ok(guard
            .iter()
            .filter(|j| wanted.contains(j.apply_url.as_str()))
            .map(|j| j.apply_url.clone())
            .collect())
    }

    async fn insert_many(&self, jobs: Vec<NewJob>) -> Result<Vec<String>> {
        let mut guard = self.jobs.write().expect("jobs lock poisoned");
        let mut taken: HashSet<String> = guard.iter().map(|j| j.apply_url.clone()).collect();
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(jobs.len());
        for job in jobs {
            if !taken.insert(job.apply_url.clone()) {
                continue;
            }
            let experience_min_years = job.experience.as_deref().and_then(experience::min_years);
            inserted.push(job.apply_url.clone());
            guard.push(JobEntry {
                id: Uuid::now_v7(),
                job_title: job.job_title,
                job_description: job.job_description,
                apply_url: job.apply_url,
                company_image: job.company_image,
                location: job.location,
                skills: job.skills,
                work_mode: job.work_mode,
                job_type: job.job_type,
                experience: job.experience,
                experience_min_years,
                date_posted: job.date_posted.unwrap_or(now),
                created_at: now,
            });
        }
        Ok(inserted)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<JobEntry>> {
        let wanted: HashSet<&Uuid> = ids.iter().collect();
        let mut rows: Vec<JobEntry> = {
            let guard = self.jobs.read().expect("jobs lock poisoned");
            guard.iter().filter(|j| wanted.contains(&j.id)).cloned().collect()
        };
        rows.sort_by_key(|j| j.created_at);
        rows.reverse();
        Ok(rows)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut guard = self.jobs.write().expect("jobs lock poisoned");
        let before = guard.len();
        guard.retain(|j| j.created_at >= cutoff);
        Ok((before - guard.len()) as u64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
