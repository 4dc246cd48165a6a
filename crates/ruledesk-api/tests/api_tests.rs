#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ruledesk_api::error::ErrorBody;
use ruledesk_api::{router, AppState};
use ruledesk_core::lifecycle::DEFAULT_TEMPLATE;
use ruledesk_core::model::{Rule, RuleSnapshot, RuleSummary};
use ruledesk_core::storage::{MemoryRuleStorage, RuleStorage};
use ruledesk_core_types::schema::HEADER_REQUEST_ID;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, Arc<MemoryRuleStorage>) {
    let storage = Arc::new(MemoryRuleStorage::new());
    let state = AppState::new(storage.clone(), DEFAULT_TEMPLATE);
    (router(state), storage)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_create_then_publish() {
    let (app, _) = app();

    // Given a created rule
    let (status, body) = send(
        &app,
        Method::POST,
        "/rules",
        Some(json!({ "content": "Name: x   # keep\n" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Rule = decode(&body);

    // When it is published
    let (status, body) = send(&app, Method::PATCH, &format!("/rules/{}/publish", created.id), None).await;

    // Then the response carries content, projection and history
    assert_eq!(status, StatusCode::OK);
    let published: Rule = decode(&body);
    assert_eq!(
        published.content,
        "Name: x   # keep\nCore:\n  Id: CORE-000001\n  Status: Published\n"
    );
    assert_eq!(published.json["Core"]["Id"], "CORE-000001");
    assert_eq!(published.history.len(), 1);
}

#[tokio::test]
async fn test_crud_round() {
    let (app, _) = app();
    let (_, body) = send(&app, Method::POST, "/rules", Some(json!({ "content": "Name: a\n" }))).await;
    let created: Rule = decode(&body);
    let uri = format!("/rules/{}", created.id);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "content": "Name: b\n" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decode::<Rule>(&body).revision, 2);

    let (status, body) = send(&app, Method::GET, "/rules", None).await;
    assert_eq!(status, StatusCode::OK);
    let summaries: Vec<RuleSummary> = decode(&body);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, created.id);

    let (status, body) = send(&app, Method::GET, &format!("{uri}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    let history: Vec<RuleSnapshot> = decode(&body);
    assert_eq!(history[0].content, "Name: a\n");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(decode::<ErrorBody>(&body).code, "ERR_NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_content_is_422() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::POST, "/rules", Some(json!({ "content": "a: [1, 2\n" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(decode::<ErrorBody>(&body).code, "ERR_PARSE");
}

#[tokio::test]
async fn test_publish_of_unparseable_stored_rule_is_422_and_unchanged() {
    let (app, storage) = app();
    let rule = storage
        .create_rule("Core: [x\n".to_string(), serde_json::Value::Null)
        .unwrap();

    let (status, _) = send(&app, Method::PATCH, &format!("/rules/{}/publish", rule.id), None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(storage.get_rule(&rule.id).unwrap().content, "Core: [x\n");
}

#[tokio::test]
async fn test_scalar_core_is_400() {
    let (app, _) = app();
    let (_, body) = send(&app, Method::POST, "/rules", Some(json!({ "content": "Core: old\n" }))).await;
    let created: Rule = decode(&body);

    let (status, body) = send(&app, Method::PATCH, &format!("/rules/{}/publish", created.id), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(decode::<ErrorBody>(&body).code, "ERR_INVALID_INPUT");
}

#[tokio::test]
async fn test_template_endpoint() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/template", None).await;
    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = decode(&body);
    assert_eq!(value["content"], DEFAULT_TEMPLATE);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/rules")
        .header(HEADER_REQUEST_ID, "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(HEADER_REQUEST_ID).unwrap(),
        "req-123"
    );
}

#[tokio::test]
async fn test_error_body_carries_request_id() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/rules/missing")
        .header(HEADER_REQUEST_ID, "req-404")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: ErrorBody = decode(&bytes);

    assert_eq!(body.request_id.as_deref(), Some("req-404"));
}
