//! Benchmark result model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Id;

/// One measurement of a benchmark for a revision, executable and environment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BenchmarkResult {
    pub id: Id,
    pub revision_id: Id,
    pub executable_id: Id,
    pub benchmark_id: Id,
    pub environment_id: Id,
    pub value: f64,
    pub std_dev: Option<f64>,
    pub val_min: Option<f64>,
    pub val_max: Option<f64>,
    pub date: DateTime<Utc>,
}

/// Key of a saved result, the unit report generation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SavedResult {
    pub revision_id: Id,
    pub executable_id: Id,
    pub environment_id: Id,
}

/// Form body of a single result submission.
///
/// Every key is optional at this level; presence and content are checked by
/// result validation so clients get field-specific messages.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResultSubmission {
    pub commitid: Option<String>,
    pub branch: Option<String>,
    pub project: Option<String>,
    pub executable: Option<String>,
    pub benchmark: Option<String>,
    pub environment: Option<String>,
    pub result_value: Option<String>,
    pub revision_date: Option<String>,
    pub result_date: Option<String>,
    pub std_dev: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    /// Only used when the submission creates the benchmark.
    pub description: Option<String>,
    pub units: Option<String>,
    pub units_title: Option<String>,
    pub lessisbetter: Option<String>,
}

impl ResultSubmission {
    /// Flatten into a field map, dropping absent keys.
    pub fn into_fields(self) -> BTreeMap<String, String> {
        [
            ("commitid", self.commitid),
            ("branch", self.branch),
            ("project", self.project),
            ("executable", self.executable),
            ("benchmark", self.benchmark),
            ("environment", self.environment),
            ("result_value", self.result_value),
            ("revision_date", self.revision_date),
            ("result_date", self.result_date),
            ("std_dev", self.std_dev),
            ("min", self.min),
            ("max", self.max),
            ("description", self.description),
            ("units", self.units),
            ("units_title", self.units_title),
            ("lessisbetter", self.lessisbetter),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
    }
}

/// Form body of a batch submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct JsonResultsForm {
    /// JSON array of result objects using the same keys as a single submission.
    pub json: Option<String>,
}
