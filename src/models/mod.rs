//! Domain models for the results server.

pub mod catalog;
pub mod report;
pub mod result;

// Re-export commonly used types
pub use catalog::{
    Benchmark, Branch, DEFAULT_UNITS, DEFAULT_UNITS_TITLE, Environment, Executable, Id, Project,
    Revision,
};
pub use report::{
    BenchmarkChange, ColorCode, ListReportsQuery, Report, ReportListResponse, ReportSummary,
};
pub use result::{BenchmarkResult, JsonResultsForm, ResultSubmission, SavedResult};
