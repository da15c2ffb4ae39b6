//! Store-neutral predicate over jobs.
//!
//! A [`Filter`] is built once by the query builder and then either rendered
//! into a parameterised SQL `WHERE` clause or evaluated against rows held in
//! memory. Both paths must agree.

use sqlx::{Postgres, QueryBuilder};

use super::experience;
use crate::pkg::internal::adaptors::jobs::spec::JobEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    JobTitle,
    JobDescription,
    Location,
    WorkMode,
}

impl TextField {
    fn column(&self) -> &'static str {
        match self {
            TextField::JobTitle => "job_title",
            TextField::JobDescription => "job_description",
            TextField::Location => "location",
            TextField::WorkMode => "work_mode::text",
        }
    }

    fn value<'a>(&self, job: &'a JobEntry) -> Option<&'a str> {
        match self {
            TextField::JobTitle => Some(job.job_title.as_str()),
            TextField::JobDescription => job.job_description.as_deref(),
            TextField::Location => job.location.as_deref(),
            TextField::WorkMode => job.work_mode.as_ref().map(|m| m.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// Case-insensitive substring match.
    Contains { field: TextField, needle: String },
    SkillsAny(Vec<String>),
    SkillsAll(Vec<String>),
    /// Job's minimum required years is known and `<=` the given years.
    MaxMinYears(i32),
}

impl Filter {
    /// Matches every job.
    pub fn all() -> Self {
        Filter::And(vec![])
    }

    pub fn and(mut parts: Vec<Filter>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Filter::And(parts)
        }
    }

    pub fn or(mut parts: Vec<Filter>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Filter::Or(parts)
        }
    }

    pub fn contains(field: TextField, needle: &str) -> Self {
        Filter::Contains {
            field,
            needle: needle.to_string(),
        }
    }

    #[cfg(test)]
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::And(parts) if parts.is_empty())
    }

    pub fn matches(&self, job: &JobEntry) -> bool {
        match self {
            Filter::And(parts) => parts.iter().all(|p| p.matches(job)),
            Filter::Or(parts) => parts.iter().any(|p| p.matches(job)),
            Filter::Contains { field, needle } => field
                .value(job)
                .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Filter::SkillsAny(wanted) => wanted.iter().any(|s| job.skills.contains(s)),
            Filter::SkillsAll(wanted) => wanted.iter().all(|s| job.skills.contains(s)),
            Filter::MaxMinYears(years) => job
                .experience_min_years
                .or_else(|| job.experience.as_deref().and_then(experience::min_years))
                .map(|min| min <= *years)
                .unwrap_or(false),
        }
    }

    /// Appends this predicate to `qb`. Every user supplied value is bound.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Filter::And(parts) => push_group(qb, parts, " AND ", "TRUE"),
            Filter::Or(parts) => push_group(qb, parts, " OR ", "FALSE"),
            Filter::Contains { field, needle } => {
                qb.push(field.column())
                    .push(" ILIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)))
                    .push(" ESCAPE '\\'");
            }
            Filter::SkillsAny(wanted) => {
                qb.push("skills && ").push_bind(wanted.clone());
            }
            Filter::SkillsAll(wanted) => {
                qb.push("skills @> ").push_bind(wanted.clone());
            }
            Filter::MaxMinYears(years) => {
                qb.push("(experience_min_years IS NOT NULL AND experience_min_years <= ")
                    .push_bind(*years)
                    .push(")");
            }
        }
    }
}

fn push_group(qb: &mut QueryBuilder<'_, Postgres>, parts: &[Filter], joiner: &str, empty: &str) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        part.push_sql(qb);
    }
    qb.push(")");
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
