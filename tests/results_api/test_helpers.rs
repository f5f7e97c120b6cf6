//! Shared test helpers for results API tests.

use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::{App, test, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use codespeed_lib::api;
use codespeed_lib::auth::{AuthSettings, UserDirectory};
use codespeed_lib::store::ResultStore;

/// Environment registered in every test store.
pub const TEST_ENVIRONMENT: &str = "Dual Core";

/// Active submitter account.
pub const CI_USER: (&str, &str) = ("ci-runner", "ci-pass");

/// Deactivated submitter account.
pub const RETIRED_USER: (&str, &str) = ("retired", "old-pass");

pub fn test_users() -> UserDirectory {
    let mut users = UserDirectory::default();
    users.insert(CI_USER.0, CI_USER.1, true);
    users.insert(RETIRED_USER.0, RETIRED_USER.1, false);
    users
}

pub fn test_store() -> ResultStore {
    ResultStore::with_environments([TEST_ENVIRONMENT])
}

pub fn settings(allow_anonymous_post: bool) -> AuthSettings {
    AuthSettings {
        allow_anonymous_post,
        require_secure_auth: false,
    }
}

/// Create a test app sharing `store`.
pub async fn create_test_app(
    store: &ResultStore,
    settings: AuthSettings,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(settings))
            .app_data(web::Data::new(test_users()))
            .configure(api::configure_routes),
    )
    .await
}

/// `Authorization` header carrying Basic credentials.
pub fn basic_auth((username, password): (&str, &str)) -> (header::HeaderName, String) {
    (
        header::AUTHORIZATION,
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", username, password))
        ),
    )
}

/// Form fields of a valid submission.
pub fn result_form(
    commitid: &str,
    revision_date: &str,
    benchmark: &str,
    value: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("commitid", commitid.to_string()),
        ("branch", "default".to_string()),
        ("project", "MyProject".to_string()),
        ("executable", "myexe O3 64bits".to_string()),
        ("benchmark", benchmark.to_string()),
        ("environment", TEST_ENVIRONMENT.to_string()),
        ("result_value", value.to_string()),
        ("revision_date", revision_date.to_string()),
    ]
}

/// POST to `uri` with an urlencoded body and optional credentials.
/// Returns status and body text.
pub async fn post_form<S>(
    app: &S,
    uri: &str,
    form: &[(&'static str, String)],
    credentials: Option<(&str, &str)>,
) -> (u16, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::post().uri(uri).set_form(form);
    if let Some(creds) = credentials {
        req = req.insert_header(basic_auth(creds));
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

/// POST a single result.
pub async fn post_result<S>(
    app: &S,
    form: &[(&'static str, String)],
    credentials: Option<(&str, &str)>,
) -> (u16, String)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    post_form(app, "/result/add/", form, credentials).await
}
