//! Batch (JSON) result submission tests.

use serde_json::json;

use crate::test_helpers::*;

const JSON_URI: &str = "/result/add/json/";

fn entry(commitid: &str, benchmark: &str, value: f64) -> serde_json::Value {
    json!({
        "commitid": commitid,
        "branch": "default",
        "project": "MyProject",
        "executable": "myexe O3 64bits",
        "benchmark": benchmark,
        "environment": TEST_ENVIRONMENT,
        "result_value": value,
        "revision_date": "2011-05-05 03:01:45",
        "std_dev": 1.11111,
        "max": 2.0,
        "min": 1.0,
    })
}

fn json_form(payload: &serde_json::Value) -> Vec<(&'static str, String)> {
    vec![("json", payload.to_string())]
}

#[actix_rt::test]
async fn test_batch_is_saved() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let payload = json!([
        entry("123", "float", 456.0),
        entry("123", "richards", 0.25),
        entry("123", "nbody", 1.5),
    ]);
    let (status, body) = post_form(&app, JSON_URI, &json_form(&payload), Some(CI_USER)).await;

    assert_eq!(status, 202);
    assert_eq!(body, "All result data saved successfully");
    assert_eq!(store.read().unwrap().result_count(), 3);
}

#[actix_rt::test]
async fn test_batch_refused_for_anonymous_when_disabled() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let payload = json!([entry("123", "float", 456.0)]);
    let (status, _) = post_form(&app, JSON_URI, &json_form(&payload), None).await;

    assert_eq!(status, 403);
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_batch_challenges_inactive_account() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let payload = json!([entry("123", "float", 456.0)]);
    let (status, _) = post_form(&app, JSON_URI, &json_form(&payload), Some(RETIRED_USER)).await;

    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_batch_challenges_wrong_password() {
    let store = test_store();
    let app = create_test_app(&store, settings(false)).await;

    let payload = json!([entry("123", "float", 456.0)]);
    let credentials = Some((CI_USER.0, "wrong"));
    let (status, _) = post_form(&app, JSON_URI, &json_form(&payload), credentials).await;

    assert_eq!(status, 401);
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_missing_json_key_is_bad_request() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = vec![("data", "[]".to_string())];
    let (status, body) = post_form(&app, JSON_URI, &form, Some(CI_USER)).await;

    assert_eq!(status, 400);
    assert!(body.contains("No key 'json' in POST payload"));
}

#[actix_rt::test]
async fn test_invalid_item_is_bad_request() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let mut bad = entry("123", "float", 456.0);
    if let Some(object) = bad.as_object_mut() {
        object.remove("project");
    }
    let payload = json!([bad]);
    let (status, body) = post_form(&app, JSON_URI, &json_form(&payload), Some(CI_USER)).await;

    assert_eq!(status, 400);
    assert!(body.contains(r#"Key \"project\" missing from request"#));
    assert_eq!(store.read().unwrap().result_count(), 0);
}

#[actix_rt::test]
async fn test_unparsable_json_is_bad_request() {
    let store = test_store();
    let app = create_test_app(&store, settings(true)).await;

    let form = vec![("json", "[{not json".to_string())];
    let (status, body) = post_form(&app, JSON_URI, &form, Some(CI_USER)).await;

    assert_eq!(status, 400);
    assert!(body.contains("JSON parsing error"));
}
