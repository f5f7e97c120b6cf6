//! Result submission endpoints.
//!
//! Both endpoints check the caller in two steps: a caller presenting no
//! credentials is refused with 403 unless anonymous posting is allowed, then
//! the basic-auth gate challenges any caller that is still not authenticated
//! (failed, malformed or inactive credentials) with 401.

use actix_web::{HttpResponse, web};
use tracing::{debug, error, info};

use crate::auth::{AuthSettings, AuthState, Principal, RESULTS_REALM, basic_auth_required};
use crate::error::{AppError, AppResult};
use crate::models::{JsonResultsForm, ResultSubmission, SavedResult};
use crate::services::results::fields_from_json;
use crate::services::{create_report_if_enough_data, save_result};
use crate::store::ResultStore;

/// Body of a successful single submission.
pub const RESULT_SAVED: &str = "Result data saved successfully";
/// Body of a successful batch submission.
pub const ALL_RESULTS_SAVED: &str = "All result data saved successfully";

/// Refuse anonymous callers outright while anonymous posting is disabled.
fn reject_anonymous(settings: &AuthSettings, state: &AuthState) -> AppResult<()> {
    if state.is_anonymous() && !settings.allow_anonymous_post {
        info!("Refusing anonymous result submission");
        return Err(AppError::Forbidden(
            "Anonymous result submission is disabled".to_string(),
        ));
    }
    Ok(())
}

fn invalid_form(err: actix_web::Error) -> AppError {
    AppError::InvalidInput(format!("Invalid form payload: {}", err))
}

fn save_single(store: &ResultStore, submission: ResultSubmission) -> AppResult<()> {
    let fields = submission.into_fields();
    let saved = save_result(store, &fields).inspect_err(|e| {
        error!("Could not save result: {}", e);
    })?;
    create_report_if_enough_data(store, saved)?;
    debug!("add_result: completed");
    Ok(())
}

fn save_batch(store: &ResultStore, form: JsonResultsForm) -> AppResult<usize> {
    let payload = form
        .json
        .filter(|j| !j.is_empty())
        .ok_or_else(|| AppError::InvalidInput("No key 'json' in POST payload".to_string()))?;

    let data: serde_json::Value = serde_json::from_str(&payload)?;
    let items = data
        .as_array()
        .ok_or_else(|| AppError::InvalidInput("Expected a JSON array of results".to_string()))?;
    info!("add_json_results request with {} entries", items.len());

    let mut unique_reports: Vec<SavedResult> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        debug!("add_json_results: save item {}", i);
        let fields = fields_from_json(item)?;
        let saved = save_result(store, &fields).inspect_err(|e| {
            error!("Could not save result {}: {}", i, e);
        })?;
        if !unique_reports.contains(&saved) {
            unique_reports.push(saved);
        }
    }

    for saved in unique_reports {
        create_report_if_enough_data(store, saved)?;
    }

    debug!("add_json_results: completed");
    Ok(items.len())
}

/// Submit a single benchmark result.
#[utoipa::path(
    post,
    path = "/result/add/",
    tag = "Results",
    request_body(
        content = ResultSubmission,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 202, description = "Result saved", body = String),
        (status = 400, description = "Invalid submission", body = crate::error::ErrorResponse),
        (status = 401, description = "Credentials invalid, malformed or inactive", body = crate::error::ErrorResponse),
        (status = 403, description = "Anonymous submission refused", body = crate::error::ErrorResponse),
    ),
    security(("basic_auth" = []), ())
)]
pub async fn add_result(
    store: web::Data<ResultStore>,
    settings: web::Data<AuthSettings>,
    principal: Principal,
    form: Result<web::Form<ResultSubmission>, actix_web::Error>,
) -> AppResult<HttpResponse> {
    let state = principal.into_inner();
    let settings = settings.get_ref();
    reject_anonymous(settings, &state)?;

    basic_auth_required(RESULTS_REALM).call(settings, &state, || {
        let submission = form.map_err(invalid_form)?.into_inner();
        save_single(&store, submission)
    })??;

    Ok(HttpResponse::Accepted().body(RESULT_SAVED))
}

/// Submit a batch of benchmark results as a JSON array in the `json` form field.
#[utoipa::path(
    post,
    path = "/result/add/json/",
    tag = "Results",
    request_body(
        content = JsonResultsForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 202, description = "All results saved", body = String),
        (status = 400, description = "Invalid payload or submission", body = crate::error::ErrorResponse),
        (status = 401, description = "Credentials invalid, malformed or inactive", body = crate::error::ErrorResponse),
        (status = 403, description = "Anonymous submission refused", body = crate::error::ErrorResponse),
    ),
    security(("basic_auth" = []), ())
)]
pub async fn add_json_results(
    store: web::Data<ResultStore>,
    settings: web::Data<AuthSettings>,
    principal: Principal,
    form: Result<web::Form<JsonResultsForm>, actix_web::Error>,
) -> AppResult<HttpResponse> {
    let state = principal.into_inner();
    let settings = settings.get_ref();
    reject_anonymous(settings, &state)?;

    let saved = basic_auth_required(RESULTS_REALM).call(settings, &state, || {
        let form = form.map_err(invalid_form)?.into_inner();
        save_batch(&store, form)
    })??;
    info!(caller = %state.display_name(), saved, "Batch of results saved");

    Ok(HttpResponse::Accepted().body(ALL_RESULTS_SAVED))
}

/// Configure result submission routes. Only POST is routed; other methods get 405.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/result/add/").route(web::post().to(add_result)))
        .service(web::resource("/result/add/json/").route(web::post().to(add_json_results)));
}
