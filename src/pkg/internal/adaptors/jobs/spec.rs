use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "work_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    Onsite,
    Remote,
    Hybrid,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Onsite => "onsite",
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
        }
    }
}

impl FromStr for WorkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onsite" | "on-site" => Ok(WorkMode::Onsite),
            "remote" => Ok(WorkMode::Remote),
            "hybrid" => Ok(WorkMode::Hybrid),
            other => Err(format!("unknown work_mode `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "job_type")]
pub enum JobType {
    #[sqlx(rename = "part time")]
    #[serde(rename = "part time")]
    PartTime,
    #[sqlx(rename = "full time")]
    #[serde(rename = "full time")]
    FullTime,
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "part time" | "part-time" | "part_time" | "parttime" => Ok(JobType::PartTime),
            "full time" | "full-time" | "full_time" | "fulltime" => Ok(JobType::FullTime),
            other => Err(format!("unknown job_type `{}`", other)),
        }
    }
}

/// A stored job posting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobEntry {
    pub id: Uuid,
    pub job_title: String,
    pub job_description: Option<String>,
    pub apply_url: String,
    pub company_image: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub work_mode: Option<WorkMode>,
    pub job_type: Option<JobType>,
    pub experience: Option<String>,
    pub experience_min_years: Option<i32>,
    pub date_posted: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub const JOB_COLUMNS: &str = "id, job_title, job_description, apply_url, company_image, location, skills, \
     work_mode, job_type, experience, experience_min_years, date_posted, created_at";

/// A validated candidate ready for insertion.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewJob {
    #[serde(default)]
    #[validate(length(min = 1, message = "job_title is required"))]
    pub job_title: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub job_description: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "apply_url is required"))]
    pub apply_url: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub company_image: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub work_mode: Option<WorkMode>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub job_type: Option<JobType>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub experience: Option<String>,
    #[serde(default)]
    pub date_posted: Option<DateTime<Utc>>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Free-text fields also take numbers and booleans, stored as their text.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid type: expected text, found {}",
            other
        ))),
    }
}
