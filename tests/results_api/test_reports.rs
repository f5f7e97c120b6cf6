//! Report generation and read-only endpoint tests.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::test_helpers::*;

async fn get_json<S>(app: &S, uri: &str) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_rt::test]
async fn test_no_report_for_first_revision() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = result_form("1", "2011-05-05 03:01:45", "float", "1.0");
    let (status, _) = post_result(&app, &form, Some(CI_USER)).await;
    assert_eq!(status, 202);

    let (status, body) = get_json(&app, "/api/v1/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["reports"].as_array().map(Vec::len), Some(0));
}

#[actix_rt::test]
async fn test_second_revision_produces_report() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let first = result_form("1", "2011-05-05 03:01:45", "float", "1.0");
    let second = result_form("2", "2011-05-06 03:01:45", "float", "2.0");
    assert_eq!(post_result(&app, &first, Some(CI_USER)).await.0, 202);
    assert_eq!(post_result(&app, &second, Some(CI_USER)).await.0, 202);

    let (status, body) = get_json(&app, "/api/v1/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let report = &body["reports"][0];
    assert_eq!(report["project"], "MyProject");
    assert_eq!(report["branch"], "default");
    assert_eq!(report["commitid"], "2");
    assert_eq!(report["environment"], TEST_ENVIRONMENT);
    assert_eq!(report["colorcode"], "red");
    assert_eq!(report["summary"], "float: +100.0% (regression)");
    assert_eq!(report["changes"][0]["benchmark"], "float");
    assert_eq!(report["changes"][0]["regression"], true);
}

#[actix_rt::test]
async fn test_report_limit_is_applied() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let revisions = [
        ("1", "2011-05-01 00:00:00", "1.0"),
        ("2", "2011-05-02 00:00:00", "1.0"),
        ("3", "2011-05-03 00:00:00", "1.0"),
    ];
    for (commit, date, value) in revisions {
        let form = result_form(commit, date, "float", value);
        assert_eq!(post_result(&app, &form, Some(CI_USER)).await.0, 202);
    }

    let (_, body) = get_json(&app, "/api/v1/reports?limit=1").await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["reports"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["reports"][0]["colorcode"], "none");
    assert_eq!(body["reports"][0]["summary"], "No significant changes");
}

#[actix_rt::test]
async fn test_health_and_info() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let (status, body) = get_json(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app, "/api/v1/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["environments"][0], TEST_ENVIRONMENT);
    assert_eq!(body["results"], 0);
    assert_eq!(body["allow_anonymous_post"], false);
}

#[actix_rt::test]
async fn test_openapi_document_declares_basic_auth() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let (status, body) = get_json(&app, "/api/v1/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/result/add/").is_some());
    assert!(body["paths"].get("/result/add/json/").is_some());
    assert_eq!(
        body["components"]["securitySchemes"]["basic_auth"]["scheme"],
        "basic"
    );
}
