use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::scout::router::submit_handler;
use crate::workflows::scout::ScoutService;

fn post_json(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_store_failure() {
    let service = Arc::new(ScoutService::new(
        Arc::new(UnavailableStore),
        Arc::new(catalog()),
        clock(),
    ));

    let response = submit_handler(State(service), axum::Json(submission())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("storage offline"));
}

#[tokio::test]
async fn submit_route_accepts_form_payloads() {
    let (service, _) = build_service();
    let router = scout_router_with_service(service);
    let payload = serde_json::json!({
        "name": "Li Wei",
        "nationality": "CN",
        "visaKind": "visa_type_work",
        "jlpt": "N2",
        "dynamicFields": { "職務内容": "開発" }
    });

    let response = router
        .oneshot(post_json(
            "/api/v1/scout/applications",
            serde_json::to_vec(&payload).expect("json"),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = read_json_body(response).await;
    assert_eq!(body["visa_kind"], "skilled-worker");
    assert_eq!(body["jlpt"], "N2");
    assert!(body.get("name").is_none(), "personal fields are not echoed");
}

#[tokio::test]
async fn latest_application_is_not_found_before_submission() {
    let (service, _) = build_service();
    let router = scout_router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/scout/applications/latest"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn jobs_route_reports_missing_application() {
    let (service, _) = build_service();
    let router = scout_router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/scout/jobs"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "no_application");
    assert_eq!(body["jobs"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn jobs_route_returns_localized_cards_in_rank_order() {
    let (service, _) = build_service();
    service.submit(submission()).expect("submitted");
    let router = scout_router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/scout/jobs?lang=en"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "matched");
    assert_eq!(body["language"], "en");
    let jobs = body["jobs"].as_array().expect("jobs array");
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["id"], "job-exact");
    assert_eq!(jobs[0]["score"], 100);
    assert_eq!(jobs[0]["posted_label"], "Today");
    assert_eq!(
        jobs[0]["reason_labels"],
        serde_json::json!(["Japanese level exact match", "Visa type match"])
    );
    assert_eq!(jobs[1]["id"], "job-near");
}

#[tokio::test]
async fn apply_route_records_and_reports_repeat_applications() {
    let (service, _) = build_service();
    let router = scout_router_with_service(service);

    let first = router
        .clone()
        .oneshot(post_json("/api/v1/scout/jobs/job-near/apply", Vec::new()))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(read_json_body(first).await["already_applied"], false);

    let second = router
        .clone()
        .oneshot(post_json("/api/v1/scout/jobs/job-near/apply", Vec::new()))
        .await
        .expect("router responds");
    assert_eq!(read_json_body(second).await["already_applied"], true);

    let applied = router
        .oneshot(get("/api/v1/scout/applied"))
        .await
        .expect("router responds");
    assert_eq!(
        read_json_body(applied).await["job_ids"],
        serde_json::json!(["job-near"])
    );
}

#[tokio::test]
async fn unknown_jobs_return_not_found() {
    let (service, _) = build_service();
    let router = scout_router_with_service(service);

    let detail = router
        .clone()
        .oneshot(get("/api/v1/scout/jobs/job-404"))
        .await
        .expect("router responds");
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    let apply = router
        .oneshot(post_json("/api/v1/scout/jobs/job-404/apply", Vec::new()))
        .await
        .expect("router responds");
    assert_eq!(apply.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json_body(apply).await["job_id"], "job-404");
}

#[tokio::test]
async fn job_detail_route_includes_localized_reasons() {
    let (service, _) = build_service();
    service.submit(submission()).expect("submitted");
    let router = scout_router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/scout/jobs/job-near?lang=ja"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["job"]["id"], "job-near");
    assert_eq!(body["score"], 35);
    assert_eq!(
        body["reason_labels"],
        serde_json::json!(["日本語レベル近似（±1）", "新着求人ボーナス"])
    );
    assert_eq!(body["posted_label"], "7日前");
}
