//! Single result submission tests.

use actix_web::http::{StatusCode, header};
use actix_web::test;

use crate::test_helpers::*;

#[actix_rt::test]
async fn test_anonymous_post_refused_when_disabled() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let (status, body) = post_result(&app, &form, None).await;

    assert_eq!(status, 403);
    assert!(body.contains("FORBIDDEN"));
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_anonymous_post_accepted_when_allowed() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let (status, body) = post_result(&app, &form, None).await;

    assert_eq!(status, 202);
    assert_eq!(body, "Result data saved successfully");
    assert_eq!(store.read().unwrap().result_count(), 1);
}

#[actix_rt::test]
async fn test_authenticated_post_accepted() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let (status, body) = post_result(&app, &form, Some(CI_USER)).await;

    assert_eq!(status, 202);
    assert_eq!(body, "Result data saved successfully");

    let state = store.read().unwrap();
    assert_eq!(state.result_count(), 1);
    let bench = state.benchmark_by_name("float").expect("benchmark created");
    assert_eq!(bench.units, "seconds");
    assert!(bench.lessisbetter);
}

#[actix_rt::test]
async fn test_inactive_account_is_challenged() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let req = test::TestRequest::post()
        .uri("/result/add/")
        .set_form(&form)
        .insert_header(basic_auth(RETIRED_USER))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .expect("challenge header");
    assert_eq!(challenge, "Basic realm=\"results\"");
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_inactive_account_passes_when_anonymous_allowed() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let (status, _) = post_result(&app, &form, Some(RETIRED_USER)).await;

    assert_eq!(status, 202);
    assert_eq!(store.read().unwrap().result_count(), 1);
}

fn assert_challenged(resp: &actix_web::dev::ServiceResponse) {
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok());
    assert_eq!(challenge, Some("Basic realm=\"results\""));
}

const MALFORMED_AUTH: &str = "Basic !!not-base64!!";

#[actix_rt::test]
async fn test_wrong_password_is_challenged() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let req = test::TestRequest::post()
        .uri("/result/add/")
        .set_form(&form)
        .insert_header(basic_auth((CI_USER.0, "wrong")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_challenged(&resp);
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_wrong_password_passes_when_anonymous_allowed() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let (status, body) = post_result(&app, &form, Some((CI_USER.0, "wrong"))).await;

    assert_eq!(status, 202);
    assert_eq!(body, "Result data saved successfully");
    assert_eq!(store.read().unwrap().result_count(), 1);
}

#[actix_rt::test]
async fn test_malformed_credentials_are_challenged() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let req = test::TestRequest::post()
        .uri("/result/add/")
        .set_form(&form)
        .insert_header((header::AUTHORIZATION, MALFORMED_AUTH))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_challenged(&resp);
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_malformed_credentials_pass_when_anonymous_allowed() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    let req = test::TestRequest::post()
        .uri("/result/add/")
        .set_form(&form)
        .insert_header((header::AUTHORIZATION, MALFORMED_AUTH))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(store.read().unwrap().result_count(), 1);
}

#[actix_rt::test]
async fn test_get_is_not_allowed() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let req = test::TestRequest::get().uri("/result/add/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_rt::test]
async fn test_missing_key_is_bad_request() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form: Vec<_> = result_form("23", "2011-05-05 03:01:45", "float", "458")
        .into_iter()
        .filter(|(k, _)| *k != "environment")
        .collect();
    let (status, body) = post_result(&app, &form, Some(CI_USER)).await;

    assert_eq!(status, 400);
    assert!(body.contains(r#"Key \"environment\" missing from request"#));
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_unknown_environment_is_bad_request() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let mut form = result_form("23", "2011-05-05 03:01:45", "float", "458");
    for (key, value) in form.iter_mut() {
        if *key == "environment" {
            *value = "Quad Core".to_string();
        }
    }
    let (status, body) = post_result(&app, &form, Some(CI_USER)).await;

    assert_eq!(status, 400);
    assert!(body.contains(r#"Environment \"Quad Core\" not found"#));
}
