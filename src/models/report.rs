//! Report domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Id;

/// Overall verdict of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ColorCode {
    /// At least one significant regression.
    Red,
    /// Significant improvements only.
    Green,
    /// Nothing beyond the change threshold.
    #[serde(rename = "none")]
    Neutral,
}

impl ColorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Neutral => "none",
        }
    }
}

impl std::fmt::Display for ColorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Change of one benchmark against the previous revision.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BenchmarkChange {
    pub benchmark: String,
    pub units: String,
    pub value: f64,
    pub previous: f64,
    /// Percentage change, positive when the value went up.
    pub change: f64,
    /// Beyond the change threshold.
    pub significant: bool,
    /// Moved in the wrong direction for the benchmark.
    pub regression: bool,
}

/// Comparison of a revision's results with the previous revision.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub revision_id: Id,
    pub executable_id: Id,
    pub environment_id: Id,
    pub changes: Vec<BenchmarkChange>,
    pub summary: String,
    pub colorcode: ColorCode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report as returned by the API, with names resolved.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportSummary {
    pub id: Uuid,
    pub project: String,
    pub branch: String,
    pub commitid: String,
    pub revision_date: DateTime<Utc>,
    pub executable: String,
    pub environment: String,
    pub summary: String,
    pub colorcode: ColorCode,
    pub changes: Vec<BenchmarkChange>,
    pub updated_at: DateTime<Utc>,
}

/// Reports listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListResponse {
    pub reports: Vec<ReportSummary>,
    pub total: usize,
}

/// Query parameters for listing reports.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListReportsQuery {
    /// Maximum number of reports (default 10, max 100).
    pub limit: Option<usize>,
}

impl ListReportsQuery {
    pub fn clamped_limit(&self) -> usize {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}
