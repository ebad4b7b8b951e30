//! End-to-end API tests over `warp::test`
//!
//! Every route is exercised against a real store and a real static dir, so
//! these pin down the externally visible contract: status codes, body
//! shapes, validation messages, and the SPA fallback behavior.

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rdc_store::SubmissionStore;
use rdc_test_utils::{complete_consent_json, survey_json_with_answers};
use serde_json::{json, Value};
use warp::{Filter, Reply};

fn app(
    store: Arc<SubmissionStore>,
    static_dir: &Path,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    rdc_api::routes(store, static_dir.to_path_buf())
}

/// Store + static dir with an index page, the way the server runs
fn fixture() -> (Arc<SubmissionStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>rdc client</html>").unwrap();
    (Arc::new(SubmissionStore::in_memory()), dir)
}

fn body_json(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn survey_payload(respondent: &str) -> Value {
    let mut payload = survey_json_with_answers(json!({"u1": 4, "u2": 5}));
    payload["metadata"]["respondentId"] = json!(respondent);
    payload
}

#[tokio::test]
async fn health_reports_ok() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("GET")
        .path("/api/health")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_json(&response), json!({"status": "ok"}));
}

#[tokio::test]
async fn consent_lifecycle_create_then_idempotent_delete() {
    let (store, dir) = fixture();
    let api = app(store.clone(), dir.path());

    let created = warp::test::request()
        .method("POST")
        .path("/api/consent")
        .json(&complete_consent_json())
        .reply(&api)
        .await;
    assert_eq!(created.status(), 201);
    let body = body_json(&created);
    assert_eq!(body["message"], "Consent stored");
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(store.consent_count(), 1);

    let deleted = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/consent/{id}"))
        .reply(&api)
        .await;
    assert_eq!(deleted.status(), 200);
    assert_eq!(body_json(&deleted), json!({"message": "Deleted"}));

    let again = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/consent/{id}"))
        .reply(&api)
        .await;
    assert_eq!(again.status(), 404);
    assert_eq!(body_json(&again), json!({"error": "Not found"}));
}

#[tokio::test]
async fn consent_rejection_names_the_field() {
    let (store, dir) = fixture();
    let api = app(store.clone(), dir.path());

    let mut payload = complete_consent_json();
    payload["consent3"] = json!(false);

    let response = warp::test::request()
        .method("POST")
        .path("/api/consent")
        .json(&payload)
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body_json(&response)["error"], "consent3 must be checked");
    assert_eq!(store.consent_count(), 0);
}

#[tokio::test]
async fn malformed_json_body_is_a_named_400() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("POST")
        .path("/api/consent")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body_json(&response)["error"], "Invalid JSON payload");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let big = "x".repeat(11 * 1024);
    let response = warp::test::request()
        .method("POST")
        .path("/api/surveys")
        .header("content-type", "application/json")
        .body(json!({"answers": {}, "padding": big}).to_string())
        .reply(&api)
        .await;

    assert_eq!(response.status(), 413);
}

#[tokio::test]
async fn survey_roundtrip_create_then_get() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let created = warp::test::request()
        .method("POST")
        .path("/api/surveys")
        .json(&survey_payload("r-1"))
        .reply(&api)
        .await;
    assert_eq!(created.status(), 201);
    let body = body_json(&created);
    assert_eq!(body["message"], "Survey saved");
    let id = body["id"].as_str().unwrap().to_string();

    let fetched = warp::test::request()
        .method("GET")
        .path(&format!("/api/surveys/{id}"))
        .reply(&api)
        .await;
    assert_eq!(fetched.status(), 200);
    let record = body_json(&fetched);

    assert_eq!(record["metadata"]["respondentId"], "r-1");
    assert_eq!(record["comments"]["usability"], "smooth");
    assert_eq!(record["sections"][0]["questionIds"], json!(["u1", "u2"]));
    let mut answers: Vec<(String, i64)> = record["answers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            (
                a["questionId"].as_str().unwrap().to_string(),
                a["value"].as_i64().unwrap(),
            )
        })
        .collect();
    answers.sort();
    assert_eq!(answers, vec![("u1".to_string(), 4), ("u2".to_string(), 5)]);
}

#[tokio::test]
async fn survey_validation_messages_are_joined() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("POST")
        .path("/api/surveys")
        .json(&json!({"answers": {"u1": 9}, "reviewed": "yes"}))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        body_json(&response)["error"],
        "answers.u1 must be an integer between 1 and 5; reviewed must be a boolean"
    );
}

#[tokio::test]
async fn duplicate_question_ids_rejected_at_create() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("POST")
        .path("/api/surveys")
        .json(&json!({
            "answers": [
                {"questionId": "u1", "value": 2},
                {"questionId": "u1", "value": 4},
            ],
        }))
        .reply(&api)
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(
        body_json(&response)["error"],
        "Duplicate questionId found in answers"
    );
}

#[tokio::test]
async fn listing_pages_and_filters() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    for i in 1..=7 {
        let created = warp::test::request()
            .method("POST")
            .path("/api/surveys")
            .json(&survey_payload(&format!("r-{i}")))
            .reply(&api)
            .await;
        assert_eq!(created.status(), 201);
    }

    let page = warp::test::request()
        .method("GET")
        .path("/api/surveys?page=2&limit=5")
        .reply(&api)
        .await;
    assert_eq!(page.status(), 200);
    let body = body_json(&page);
    assert_eq!(body["total"], 7);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    // Newest first, so page 2 holds the two oldest
    assert_eq!(body["results"][0]["metadata"]["respondentId"], "r-2");
    assert_eq!(body["results"][1]["metadata"]["respondentId"], "r-1");

    let filtered = warp::test::request()
        .method("GET")
        .path("/api/surveys?respondentId=r-3")
        .reply(&api)
        .await;
    let body = body_json(&filtered);
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 25);

    let unreviewed = warp::test::request()
        .method("GET")
        .path("/api/surveys?reviewed=false")
        .reply(&api)
        .await;
    assert_eq!(body_json(&unreviewed)["total"], 7);
}

#[tokio::test]
async fn patch_marks_reviewed_and_stamps_timestamp() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let created = warp::test::request()
        .method("POST")
        .path("/api/surveys")
        .json(&survey_payload("r-1"))
        .reply(&api)
        .await;
    let id = body_json(&created)["id"].as_str().unwrap().to_string();

    let patched = warp::test::request()
        .method("PATCH")
        .path(&format!("/api/surveys/{id}"))
        .json(&json!({"reviewed": true, "reviewedBy": "dr-jones"}))
        .reply(&api)
        .await;
    assert_eq!(patched.status(), 200);
    let record = body_json(&patched);
    assert_eq!(record["reviewed"], true);
    assert_eq!(record["reviewedBy"], "dr-jones");
    assert!(record["reviewedAt"].is_string());
    // Untouched fields survive
    assert_eq!(record["comments"]["usability"], "smooth");

    let bad = warp::test::request()
        .method("PATCH")
        .path(&format!("/api/surveys/{id}"))
        .json(&json!({"answers": [{"questionId": "u1", "value": 6}]}))
        .reply(&api)
        .await;
    assert_eq!(bad.status(), 400);
    assert_eq!(body_json(&bad)["error"], "Invalid answers payload");
}

#[tokio::test]
async fn patch_unknown_survey_is_not_found() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("PATCH")
        .path(&format!("/api/surveys/{}", rdc_core::SubmissionId::new()))
        .json(&json!({"reviewed": true}))
        .reply(&api)
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(body_json(&response)["error"], "Survey not found");
}

#[tokio::test]
async fn delete_survey_then_not_found() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let created = warp::test::request()
        .method("POST")
        .path("/api/surveys")
        .json(&survey_payload("r-1"))
        .reply(&api)
        .await;
    let id = body_json(&created)["id"].as_str().unwrap().to_string();

    let deleted = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/surveys/{id}"))
        .reply(&api)
        .await;
    assert_eq!(deleted.status(), 200);
    let body = body_json(&deleted);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["message"], "Deleted");

    let missing = warp::test::request()
        .method("GET")
        .path(&format!("/api/surveys/{id}"))
        .reply(&api)
        .await;
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn garbage_ids_read_as_not_found() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("GET")
        .path("/api/surveys/definitely-not-a-ulid")
        .reply(&api)
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(body_json(&response)["error"], "Survey not found");
}

#[tokio::test]
async fn unknown_api_path_is_json_404_not_spa() {
    let (store, dir) = fixture();
    let api = app(store, dir.path());

    let response = warp::test::request()
        .method("GET")
        .path("/api/export/everything")
        .reply(&api)
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(body_json(&response), json!({"error": "Not Found"}));
}

#[tokio::test]
async fn non_api_paths_fall_back_to_the_entry_page() {
    let (store, dir) = fixture();
    std::fs::write(dir.path().join("app.js"), "console.log('rdc')").unwrap();
    let api = app(store, dir.path());

    // Real asset is served as-is
    let asset = warp::test::request()
        .method("GET")
        .path("/app.js")
        .reply(&api)
        .await;
    assert_eq!(asset.status(), 200);
    assert_eq!(asset.body().as_ref(), b"console.log('rdc')");

    // Client-side route falls back to the entry page
    let spa = warp::test::request()
        .method("GET")
        .path("/debrief")
        .reply(&api)
        .await;
    assert_eq!(spa.status(), 200);
    assert_eq!(spa.body().as_ref(), b"<html>rdc client</html>");
}
