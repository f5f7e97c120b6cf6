//! Result ingestion: validation and saving of submitted benchmark results.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{
    Benchmark, BenchmarkResult, DEFAULT_UNITS, DEFAULT_UNITS_TITLE, Id, SavedResult,
};
use crate::store::{ResultStore, StoreState};

/// Submitted fields, as decoded from a form or a JSON object.
pub type ResultFields = BTreeMap<String, String>;

/// Keys every submission must carry, checked in this order.
pub const MANDATORY_KEYS: [&str; 7] = [
    "commitid",
    "branch",
    "project",
    "executable",
    "benchmark",
    "environment",
    "result_value",
];

/// Naive datetime layouts accepted besides RFC 3339.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Check mandatory keys and resolve the environment.
fn validate_result(state: &StoreState, fields: &ResultFields) -> AppResult<Id> {
    for key in MANDATORY_KEYS {
        match fields.get(key) {
            None => {
                return Err(AppError::InvalidInput(format!(
                    "Key \"{}\" missing from request",
                    key
                )));
            }
            Some(value) if value.is_empty() => {
                return Err(AppError::InvalidInput(format!(
                    "Value for key \"{}\" empty in request",
                    key
                )));
            }
            Some(_) => {}
        }
    }

    let name = &fields["environment"];
    state
        .environment_by_name(name)
        .map(|e| e.id)
        .ok_or_else(|| AppError::InvalidInput(format!("Environment \"{}\" not found", name)))
}

/// Value of an optional key; empty strings and `None` count as absent.
fn optional<'a>(fields: &'a ResultFields, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "None")
}

fn parse_number(key: &str, value: &str) -> AppResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidInput(format!("Value for key \"{}\" is not a number", key)))
}

fn parse_optional_number(fields: &ResultFields, key: &str) -> AppResult<Option<f64>> {
    optional(fields, key)
        .map(|v| parse_number(key, v))
        .transpose()
}

fn parse_flag(key: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::InvalidInput(format!(
            "Value for key \"{}\" is not a boolean",
            key
        ))),
    }
}

/// Parse a submitted date. Naive values are taken as UTC.
pub fn parse_datetime(key: &str, value: &str) -> AppResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.and_utc());
    }

    Err(AppError::InvalidInput(format!(
        "Value for key \"{}\" is not a valid date: {}",
        key, value
    )))
}

fn get_or_create_benchmark(
    state: &mut StoreState,
    fields: &ResultFields,
    lessisbetter: Option<bool>,
) -> Id {
    let name = &fields["benchmark"];
    if let Some(existing) = state.benchmark_by_name(name) {
        return existing.id;
    }

    // Metadata is only taken from the submission that creates the benchmark.
    let description = optional(fields, "description")
        .unwrap_or_default()
        .to_string();
    let units = optional(fields, "units").unwrap_or(DEFAULT_UNITS).to_string();
    let units_title = optional(fields, "units_title")
        .unwrap_or(DEFAULT_UNITS_TITLE)
        .to_string();

    let id = state.insert_benchmark(|id| Benchmark {
        id,
        name: name.clone(),
        description,
        units,
        units_title,
        lessisbetter: lessisbetter.unwrap_or(true),
    });
    debug!(benchmark = %name, "Created benchmark");
    id
}

/// Validate and record one result under an already held write guard.
pub fn save_result_locked(state: &mut StoreState, fields: &ResultFields) -> AppResult<SavedResult> {
    let environment_id = validate_result(state, fields)?;

    // Parse everything up front so a bad field never leaves a half-saved result.
    let value = parse_number("result_value", &fields["result_value"])?;
    let std_dev = parse_optional_number(fields, "std_dev")?;
    let val_min = parse_optional_number(fields, "min")?;
    let val_max = parse_optional_number(fields, "max")?;
    let revision_date = optional(fields, "revision_date")
        .map(|v| parse_datetime("revision_date", v))
        .transpose()?;
    let result_date = optional(fields, "result_date")
        .map(|v| parse_datetime("result_date", v))
        .transpose()?;
    let lessisbetter = optional(fields, "lessisbetter")
        .map(|v| parse_flag("lessisbetter", v))
        .transpose()?;

    let project_id = state.get_or_create_project(&fields["project"]);
    let branch_id = state.get_or_create_branch(project_id, &fields["branch"]);
    let benchmark_id = get_or_create_benchmark(state, fields, lessisbetter);

    let commitid = &fields["commitid"];
    let (revision_id, rev_date) = match state.revision_by_commit(branch_id, commitid) {
        Some(rev) => (rev.id, rev.date),
        None => {
            let date = revision_date.unwrap_or_else(Utc::now);
            let id = state.insert_revision(branch_id, project_id, commitid, date);
            debug!(commitid = %commitid, "Created revision");
            (id, date)
        }
    };

    let executable_id = state.get_or_create_executable(project_id, &fields["executable"]);
    let date = result_date.unwrap_or(rev_date);

    match state.result_mut(revision_id, executable_id, benchmark_id, environment_id) {
        Some(existing) => {
            existing.value = value;
            existing.std_dev = std_dev;
            existing.val_min = val_min;
            existing.val_max = val_max;
            existing.date = date;
        }
        None => {
            state.insert_result(|id| BenchmarkResult {
                id,
                revision_id,
                executable_id,
                benchmark_id,
                environment_id,
                value,
                std_dev,
                val_min,
                val_max,
                date,
            });
        }
    }

    Ok(SavedResult {
        revision_id,
        executable_id,
        environment_id,
    })
}

/// Validate and record one result.
pub fn save_result(store: &ResultStore, fields: &ResultFields) -> AppResult<SavedResult> {
    let mut state = store.write()?;
    save_result_locked(&mut state, fields)
}

/// Flatten a JSON object into submission fields. Scalars are stringified and
/// nulls dropped; nested values are rejected.
pub fn fields_from_json(value: &serde_json::Value) -> AppResult<ResultFields> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::InvalidInput("Each result must be a JSON object".to_string()))?;

    let mut fields = ResultFields::new();
    for (key, value) in object {
        let text = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Value for key \"{}\" must be a scalar",
                    key
                )));
            }
        };
        fields.insert(key.clone(), text);
    }
    Ok(fields)
}
