use std::collections::HashSet;

use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::{JOB_COLUMNS, JobEntry};
use crate::pkg::internal::catalog::{SortOrder, filter::Filter};
use crate::prelude::Result;

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn find(
        &mut self,
        filter: &Filter,
        sort: SortOrder,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<JobEntry>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM jobs WHERE ", JOB_COLUMNS));
        filter.push_sql(&mut qb);
        qb.push(match sort {
            SortOrder::Latest => " ORDER BY created_at DESC, id DESC",
            SortOrder::Oldest => " ORDER BY created_at ASC, id ASC",
        });
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(skip);
        let rows = qb
            .build_query_as::<JobEntry>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&mut self, filter: &Filter) -> Result<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs WHERE ");
        filter.push_sql(&mut qb);
        let total = qb
            .build_query_scalar::<i64>()
            .fetch_one(&mut *self.pool)
            .await?;
        Ok(total)
    }

    pub async fn existing_urls(&mut self, urls: &[String]) -> Result<HashSet<String>> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT apply_url FROM jobs WHERE apply_url = ANY($1)")
                .bind(urls)
                .fetch_all(&mut *self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn get_by_ids(&mut self, ids: &[Uuid]) -> Result<Vec<JobEntry>> {
        let rows = sqlx::query_as::<_, JobEntry>(&format!(
            "SELECT {} FROM jobs WHERE id = ANY($1) ORDER BY created_at DESC, id DESC",
            JOB_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
