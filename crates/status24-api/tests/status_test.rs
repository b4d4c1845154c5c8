//! Public status page integration tests: snapshot and live feed.
//!
//! Run with: `cargo test -p status24-api --test status_test`

mod helpers;

use axum::body::{Body, BodyDataStream};
use axum::http::{header, Request, StatusCode};
use futures::StreamExt;
use helpers::fixtures::seeded_store;
use helpers::{setup_test_app, setup_test_app_with_store, ACME_ORG_ID};
use serde_json::{json, Value};
use status24_core::models::ServiceStatus;
use status24_db::DocumentStore;
use std::time::Duration;
use tower::ServiceExt;

/// Reads the next SSE event and returns its name and data.
async fn next_event(frames: &mut BodyDataStream) -> (String, String) {
    let mut buffer = String::new();
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let raw: String = buffer.drain(..end + 2).collect();
            let mut name = String::new();
            let mut data = String::new();
            for line in raw.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    name = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push_str(value.trim_start());
                }
            }
            if !name.is_empty() {
                return (name, data);
            }
            continue;
        }

        let chunk = tokio::time::timeout(Duration::from_secs(5), frames.next())
            .await
            .expect("event within timeout")
            .expect("stream still open")
            .expect("body chunk");
        buffer.push_str(std::str::from_utf8(&chunk).expect("utf-8 frame"));
    }
}

async fn open_feed(router: axum::Router, org_id: &str) -> BodyDataStream {
    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/status/{}/stream", org_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    response.into_body().into_data_stream()
}

#[tokio::test]
async fn test_status_page_unknown_org_is_not_found() {
    let app = setup_test_app().await;
    let response = app.client().get("/status/org_unknown").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Organization not found");
}

#[tokio::test]
async fn test_status_page_is_projected() {
    let app = setup_test_app_with_store(seeded_store(ACME_ORG_ID)).await;
    let response = app.client().get(&format!("/status/{}", ACME_ORG_ID)).await;

    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["organization_id"], ACME_ORG_ID);
    assert_eq!(page["name"], "acme");
    assert_eq!(page["overall_status"], "operational");

    let order: Vec<&str> = page["services"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["svc_new", "svc_old", "svc_alpha", "svc_zeta"]);

    // the dangling id is dropped
    let affected = &page["incidents"][0]["affected_services"];
    assert_eq!(affected.as_array().unwrap().len(), 1);
    assert_eq!(affected[0]["id"], "svc_new");
}

#[tokio::test]
async fn test_status_page_without_incidents() {
    let app = setup_test_app().await;
    app.state
        .organizations
        .ensure_document(ACME_ORG_ID)
        .await
        .unwrap();

    let page: Value = app
        .client()
        .get(&format!("/status/{}", ACME_ORG_ID))
        .await
        .json();
    assert_eq!(page["incidents"], json!([]));
    assert_eq!(page["services"], json!([]));
}

#[tokio::test]
async fn test_feed_pushes_every_change() {
    let app = setup_test_app_with_store(seeded_store(ACME_ORG_ID)).await;
    let mut frames = open_feed(app.router.clone(), ACME_ORG_ID).await;

    let (name, data) = next_event(&mut frames).await;
    assert_eq!(name, "status");
    let page: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(page["overall_status"], "operational");

    app.state
        .organizations
        .update_service_status(ACME_ORG_ID, "svc_new", ServiceStatus::MajorOutage)
        .await
        .unwrap();

    let (name, data) = next_event(&mut frames).await;
    assert_eq!(name, "status");
    let page: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(page["overall_status"], "major_outage");
    assert_eq!(page["services"][0]["status"], "major_outage");
}

#[tokio::test]
async fn test_feed_reports_missing_document_then_creation() {
    let app = setup_test_app().await;
    let mut frames = open_feed(app.router.clone(), ACME_ORG_ID).await;

    let (name, data) = next_event(&mut frames).await;
    assert_eq!(name, "not_found");
    assert_eq!(data, ACME_ORG_ID);

    app.state
        .organizations
        .ensure_document(ACME_ORG_ID)
        .await
        .unwrap();

    let (name, _) = next_event(&mut frames).await;
    assert_eq!(name, "status");
}

#[tokio::test]
async fn test_feed_releases_subscription_on_disconnect() {
    let app = setup_test_app_with_store(seeded_store(ACME_ORG_ID)).await;
    let store = app.state.organizations.store().clone();

    let mut frames = open_feed(app.router.clone(), ACME_ORG_ID).await;
    next_event(&mut frames).await;
    assert_eq!(store.subscriber_count(ACME_ORG_ID).await, 1);

    drop(frames);
    assert_eq!(store.subscriber_count(ACME_ORG_ID).await, 0);
}
