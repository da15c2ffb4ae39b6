use serde_json::{Map, Value};
use validator::Validate;

use crate::pkg::internal::adaptors::jobs::spec::NewJob;

const LOWERCASED: [&str; 2] = ["job_type", "work_mode"];

/// Trims every top-level string and drops NUL characters, lowercases
/// `job_type`, `work_mode` and each skill. Unknown fields are left alone.
/// Applying it twice changes nothing.
pub fn sanitize(candidate: Value) -> Value {
    match candidate {
        Value::Object(map) => Value::Object(sanitize_map(map)),
        other => other,
    }
}

fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let value = match (key.as_str(), value) {
                ("skills", value) => sanitize_skills(value),
                (k, Value::String(s)) if LOWERCASED.contains(&k) => {
                    Value::String(clean(&s).to_lowercase())
                }
                (_, Value::String(s)) => Value::String(clean(&s)),
                (_, other) => other,
            };
            (key, value)
        })
        .collect()
}

// Postgres text columns reject NUL.
fn clean(s: &str) -> String {
    s.replace('\0', "").trim().to_string()
}

fn sanitize_skills(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Value::String(clean(&s).to_lowercase()),
                    other => other,
                })
                .collect(),
        ),
        Value::String(s) => Value::Array(
            clean(&s)
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .map(Value::String)
                .collect(),
        ),
        Value::Null => Value::Array(vec![]),
        other => other,
    }
}

/// Turns a sanitized candidate into an insertable job, or explains why not.
pub fn validate(candidate: Value) -> Result<NewJob, String> {
    if !candidate.is_object() {
        return Err("expected a job object".to_string());
    }
    let job: NewJob = serde_json::from_value(candidate).map_err(|e| e.to_string())?;
    job.validate().map_err(|e| e.to_string())?;
    if !has_http_scheme(&job.apply_url) {
        return Err("apply_url must start with http:// or https://".to_string());
    }
    Ok(job)
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme))
}
