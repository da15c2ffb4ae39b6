pub mod experience;
pub mod filter;


use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    pkg::internal::adaptors::jobs::{JobStore, spec::JobEntry},
    prelude::Result,
};
use filter::{Filter, TextField};

lazy_static! {
    static ref LEADING_INT: Regex = Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer pattern");
}

/// Whether a `skills` filter needs any or all of the requested skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillsMatch {
    Any,
    All,
}

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub default_limit: i64,
    pub max_limit: i64,
    pub skills_match: SkillsMatch,
    pub insert_batch_size: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        CatalogOptions {
            default_limit: 9,
            max_limit: 1000,
            skills_match: SkillsMatch::Any,
            insert_batch_size: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Latest,
    Oldest,
}

/// Raw `GET /jobs` query parameters. Everything stays a string so malformed
/// values fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub role_type: Option<String>,
    pub job_type: Option<String>,
    pub skills: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    /// Builds params from decoded query pairs. A repeated key keeps its first
    /// non-blank value; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            if value.trim().is_empty() {
                continue;
            }
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                "q" => &mut params.q,
                "location" => &mut params.location,
                "experience" => &mut params.experience,
                "roleType" => &mut params.role_type,
                "jobType" => &mut params.job_type,
                "skills" => &mut params.skills,
                "sort" => &mut params.sort,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPlan {
    pub filter: Filter,
    pub sort: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl ListPlan {
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<JobEntry>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn leading_int(value: &str) -> Option<i64> {
    LEADING_INT
        .captures(value)
        .and_then(|c| c[1].parse::<i64>().ok())
}

/// Splits a comma separated skills parameter into trimmed, lowercased tokens.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn build_plan(params: &ListParams, opts: &CatalogOptions) -> ListPlan {
    let page = present(&params.page)
        .and_then(leading_int)
        .unwrap_or(1)
        .max(1);
    let limit = present(&params.limit)
        .and_then(leading_int)
        .filter(|l| *l > 0)
        .unwrap_or(opts.default_limit)
        .min(opts.max_limit);

    let mut parts = vec![];
    if let Some(q) = present(&params.q) {
        parts.push(Filter::or(vec![
            Filter::contains(TextField::JobTitle, q),
            Filter::contains(TextField::JobDescription, q),
            Filter::contains(TextField::Location, q),
        ]));
    }
    if let Some(role) = present(&params.role_type) {
        parts.push(Filter::or(vec![
            Filter::contains(TextField::JobTitle, role),
            Filter::contains(TextField::JobDescription, role),
        ]));
    }
    if let Some(location) = present(&params.location) {
        parts.push(Filter::contains(TextField::Location, location));
    }
    if let Some(mode) = present(&params.job_type) {
        parts.push(Filter::contains(TextField::WorkMode, mode));
    }
    if let Some(years) = present(&params.experience).and_then(experience::requested_years) {
        parts.push(Filter::MaxMinYears(years));
    }
    if let Some(raw) = present(&params.skills) {
        let skills = parse_skills(raw);
        if !skills.is_empty() {
            parts.push(match opts.skills_match {
                SkillsMatch::Any => Filter::SkillsAny(skills),
                SkillsMatch::All => Filter::SkillsAll(skills),
            });
        }
    }

    let sort = match present(&params.sort).map(str::to_lowercase).as_deref() {
        Some("oldest") => SortOrder::Oldest,
        _ => SortOrder::Latest,
    };

    ListPlan {
        filter: Filter::and(parts),
        sort,
        page,
        limit,
    }
}

pub async fn list_jobs(
    store: &dyn JobStore,
    params: &ListParams,
    opts: &CatalogOptions,
) -> Result<JobPage> {
    let plan = build_plan(params, opts);
    tracing::debug!("listing jobs with plan: {:?}", &plan);
    let (jobs, total) = tokio::try_join!(
        store.find(&plan.filter, plan.sort, plan.skip(), plan.limit),
        store.count(&plan.filter),
    )?;
    let pages = (total + plan.limit - 1) / plan.limit;
    Ok(JobPage {
        jobs,
        total,
        page: plan.page,
        pages,
    })
}
