//! Report listing endpoint.

use actix_web::{HttpResponse, get, web};

use crate::error::AppResult;
use crate::models::{ListReportsQuery, Report, ReportListResponse, ReportSummary};
use crate::store::{ResultStore, StoreState};

/// Resolve the names a report points at. Dangling ids yield `None`.
fn summarize_report(state: &StoreState, report: &Report) -> Option<ReportSummary> {
    let revision = state.revision(report.revision_id)?;
    let branch = state.branch(revision.branch_id)?;
    let project = state.project(revision.project_id)?;
    let executable = state.executable(report.executable_id)?;
    let environment = state.environment(report.environment_id)?;

    Some(ReportSummary {
        id: report.id,
        project: project.name.clone(),
        branch: branch.name.clone(),
        commitid: revision.commitid.clone(),
        revision_date: revision.date,
        executable: executable.name.clone(),
        environment: environment.name.clone(),
        summary: report.summary.clone(),
        colorcode: report.colorcode,
        changes: report.changes.clone(),
        updated_at: report.updated_at,
    })
}

/// List the most recently updated reports.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    params(
        ("limit" = Option<usize>, Query, description = "Maximum number of reports (default 10, max 100)")
    ),
    responses(
        (status = 200, description = "Reports, newest first", body = ReportListResponse)
    )
)]
#[get("/reports")]
pub async fn list_reports(
    store: web::Data<ResultStore>,
    query: web::Query<ListReportsQuery>,
) -> AppResult<HttpResponse> {
    let state = store.read()?;

    let mut reports: Vec<&Report> = state.reports().iter().collect();
    reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    let total = reports.len();
    let reports: Vec<ReportSummary> = reports
        .into_iter()
        .take(query.clamped_limit())
        .filter_map(|r| summarize_report(&state, r))
        .collect();

    Ok(HttpResponse::Ok().json(ReportListResponse { reports, total }))
}

/// Configure report routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reports);
}
