//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod reports;
pub mod results;

use actix_web::web;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use reports::configure_routes as configure_report_routes;
pub use results::configure_routes as configure_result_routes;

/// Configure every route: result submission at the root (where benchmark
/// runners post), everything else under `/api/v1`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_result_routes).service(
        web::scope("/api/v1")
            .configure(configure_health_routes)
            .configure(configure_report_routes)
            .service(openapi::openapi_json),
    );
}
