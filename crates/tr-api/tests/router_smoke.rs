use std::sync::Arc;

use axum::{body::Body, http::Request, http::StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tr_common::recommend::RecommendationRecord;
use tr_common::store::{InMemoryProfileStore, InMemoryRecommendationStore};
use tr_common::{CandidateProfile, JobProfile};

fn seeded_state(api_key: &str) -> tr_api::SharedState {
    let profiles = Arc::new(InMemoryProfileStore::new(
        vec![CandidateProfile {
            id: 1,
            external_id: "acct-1".into(),
            display_name: "Asha".into(),
            position_tags: vec!["Backend Engineer".into()],
            skills_text: "Rust, PostgreSQL".into(),
            ..CandidateProfile::default()
        }],
        vec![JobProfile {
            id: 10,
            title: "Rust Backend Engineer".into(),
            position_tags: vec!["Backend Engineer".into()],
            skill_tags: vec!["Rust".into()],
        }],
    ));
    let records = Arc::new(InMemoryRecommendationStore::new());

    tr_api::test_state_with_stores(api_key, profiles, records)
}

#[tokio::test]
async fn livez_healthy_and_api_requires_auth() {
    let state = tr_api::test_state("test-key");
    let app = tr_api::create_router(state);

    let livez_response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/livez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(livez_response.status(), StatusCode::OK);

    let unauthorized = app
        .oneshot(
            Request::builder()
                .uri("/api/talents/acct-1/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn match_trigger_returns_shortlist() {
    let app = tr_api::create_router(seeded_state("test-key"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs/10/match")
                .header("x-api-key", "test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["job_id"], 10);
    assert_eq!(json["matched"], 1);
    assert_eq!(json["matches"][0]["candidate_external_id"], "acct-1");
}

#[tokio::test]
async fn match_trigger_for_unknown_job_is_not_found() {
    let app = tr_api::create_router(seeded_state("test-key"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs/999/match")
                .header("x-api-key", "test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ai_match_rejects_empty_batches() {
    let app = tr_api::create_router(seeded_state("test-key"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs/10/ai-match")
                .header("x-api-key", "test-key")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"candidate_ids": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ai_match_evaluates_and_reports_outcomes() {
    let app = tr_api::create_router(seeded_state("test-key"));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/jobs/10/ai-match")
                .header("x-api-key", "test-key")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"candidate_ids": [1, 99]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["outcomes"][0]["status"], "evaluated");
    assert_eq!(json["outcomes"][1]["status"], "missing_profile");
}

#[tokio::test]
async fn notification_feed_excludes_seen_ids() {
    let profiles = Arc::new(InMemoryProfileStore::new(
        vec![],
        vec![JobProfile {
            id: 10,
            title: "Rust Backend Engineer".into(),
            ..JobProfile::default()
        }],
    ));
    let records = Arc::new(InMemoryRecommendationStore::new());
    let mut record = RecommendationRecord::new(1, "acct-1", 10, 8, Utc::now());
    record.staff_recommend = true;
    records.seed(record);

    let app = tr_api::create_router(tr_api::test_state_with_stores(
        "test-key", profiles, records,
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/talents/acct-1/notifications?seen=1-10-ai")
                .header("x-api-key", "test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let notifications = json["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["id"], "1-10-staff");
    assert_eq!(notifications[0]["job_title"], "Rust Backend Engineer");
}
