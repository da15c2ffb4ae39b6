use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres};
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::NewJob;
use crate::pkg::internal::catalog::experience;
use crate::prelude::Result;

const BINDS_PER_ROW: usize = 12;

/// Largest multi-row insert that stays under the Postgres bind limit.
pub const MAX_ROWS_PER_INSERT: usize = u16::MAX as usize / BINDS_PER_ROW;

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    /// Unordered bulk insert. Rows whose `apply_url` already exists are
    /// skipped by the unique constraint; the urls actually written come back.
    pub async fn create_many(&mut self, jobs: Vec<NewJob>) -> Result<Vec<String>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let now = Utc::now();
        let mut query_builder = sqlx::QueryBuilder::<Postgres>::new(
            "INSERT INTO jobs (id, job_title, job_description, apply_url, company_image, location, \
             skills, work_mode, job_type, experience, experience_min_years, date_posted) ",
        );
        query_builder.push_values(jobs, |mut b, job| {
            let min_years = job.experience.as_deref().and_then(experience::min_years);
            b.push_bind(Uuid::now_v7())
                .push_bind(job.job_title)
                .push_bind(job.job_description)
                .push_bind(job.apply_url)
                .push_bind(job.company_image)
                .push_bind(job.location)
                .push_bind(job.skills)
                .push_bind(job.work_mode)
                .push_bind(job.job_type)
                .push_bind(job.experience)
                .push_bind(min_years)
                .push_bind(job.date_posted.unwrap_or(now));
        });
        query_builder.push(" ON CONFLICT (apply_url) DO NOTHING RETURNING apply_url");
        let inserted: Vec<String> = query_builder
            .build_query_scalar::<String>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(inserted)
    }

    pub async fn delete_created_before(&mut self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM jobs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&mut *self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
