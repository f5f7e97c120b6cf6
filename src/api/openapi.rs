//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Codespeed Results Server",
        version = "0.1.0",
        description = "API server accepting benchmark results and producing change reports"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::info,
        // Result submission
        api::results::add_result,
        api::results::add_json_results,
        // Reports
        api::reports::list_reports,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ServerInfoResponse,
            // Results
            models::ResultSubmission,
            models::JsonResultsForm,
            // Reports
            models::ColorCode,
            models::BenchmarkChange,
            models::ReportSummary,
            models::ReportListResponse,
            models::ListReportsQuery,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Results", description = "Benchmark result submission"),
        (name = "Reports", description = "Change reports between revisions")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add HTTP Basic security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Basic,
                    ),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document.
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
