//! Entities results are recorded against: projects, branches, revisions,
//! executables, benchmarks and environments.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Store-assigned identifier.
pub type Id = u64;

/// A benchmarked project.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Project {
    pub id: Id,
    pub name: String,
    /// Whether new results on this project produce reports.
    pub track: bool,
}

/// A line of development inside a project.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Branch {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
}

/// A commit on a branch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Revision {
    pub id: Id,
    pub branch_id: Id,
    pub project_id: Id,
    pub commitid: String,
    pub date: DateTime<Utc>,
}

/// A build or configuration of a project that benchmarks run on.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Executable {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
}

/// Default units for benchmarks that do not declare their own.
pub const DEFAULT_UNITS: &str = "seconds";
/// Default units title for benchmarks that do not declare their own.
pub const DEFAULT_UNITS_TITLE: &str = "Time";

/// A named measurement.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Benchmark {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub units: String,
    pub units_title: String,
    /// Lower values are improvements (true for timings).
    pub lessisbetter: bool,
}

/// A machine or setup results are measured on. Configured up front, never
/// created by a submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Environment {
    pub id: Id,
    pub name: String,
}
