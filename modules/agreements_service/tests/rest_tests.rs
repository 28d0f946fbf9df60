//! HTTP tests for the resource routes

mod common;

use agreements_service::api::rest::register_routes;
use agreements_service::config::AuthConfig;
use agreements_service::contract::ProfileRole;
use agreements_service::domain::{IdentityProvider, UserAdministration};
use agreements_service::infra::auth::JwtVerifier;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::{print_test_header, TestContext};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct NoIdentity;

#[async_trait]
impl IdentityProvider for NoIdentity {
    async fn create_user(&self, _email: &str, _password: &str) -> anyhow::Result<Uuid> {
        anyhow::bail!("not used")
    }

    async fn delete_user(&self, _user_id: Uuid) -> anyhow::Result<()> {
        anyhow::bail!("not used")
    }
}

fn app() -> (TestContext, Router) {
    let ctx = TestContext::new();
    let admin = Arc::new(UserAdministration::new(
        ctx.service.clone(),
        Arc::new(JwtVerifier::new(&AuthConfig {
            jwt_secret: "unused".to_string(),
            audience: None,
        })),
        Arc::new(NoIdentity),
    ));
    let router = register_routes(Router::new(), ctx.service.clone(), admin);
    (ctx, router)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    println!("   {} -> {} {}", uri, status, json);
    (status, content_type, json)
}

async fn create_institution(router: &Router) -> String {
    let (status, _, body) = send(
        router,
        Method::POST,
        "/institutions",
        Some(json!({ "name": "Universidad de Lima", "country": "Peru" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_agreement_flow_over_http() {
    let (_ctx, router) = app();

    print_test_header(
        "test_agreement_flow_over_http",
        &["Create, read, renew, list years and delete an agreement through the JSON API."],
    );

    let institution_id = create_institution(&router).await;
    let (status, _, created) = send(
        &router,
        Method::POST,
        "/agreements",
        Some(json!({
            "name": "Convenio marco",
            "institution_id": institution_id,
            "signature_date": "2024-03-15",
            "duration_years": 2,
            "agreement_types": ["mobility"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["agreement"]["status"], "draft");
    assert_eq!(created["agreement"]["expiration_date"], "2026-03-15");
    assert_eq!(created["years"][0]["year_end"], "2025-03-14");
    assert_eq!(created["years"][1]["year_start"], "2025-03-15");
    let id = created["agreement"]["id"].as_str().unwrap().to_string();

    let (status, _, renewal) = send(
        &router,
        Method::POST,
        &format!("/agreements/{}/renewals", id),
        Some(json!({ "new_expiration_date": "2027-03-15" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(renewal["old_expiration_date"], "2026-03-15");

    let (_, _, renewals) = send(&router, Method::GET, &format!("/agreements/{}/renewals", id), None).await;
    assert_eq!(renewals["total"], 1);

    let (status, _, sync) = send(
        &router,
        Method::POST,
        &format!("/agreements/{}/years/recalculate", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sync["outcome"], "unchanged");

    let (_, _, years) = send(&router, Method::GET, &format!("/agreements/{}/years", id), None).await;
    assert_eq!(years["total"], 2);

    let (_, _, listed) = send(&router, Method::GET, "/agreements?status=draft&search=marco", None).await;
    assert_eq!(listed["total"], 1);

    let (status, _, _) = send(&router, Method::DELETE, &format!("/agreements/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, content_type, problem) =
        send(&router, Method::GET, &format!("/agreements/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type, "application/problem+json");
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["title"], "Agreement Not Found");
}

#[tokio::test]
async fn test_unsigned_agreement_reports_skipped_years() {
    let (_ctx, router) = app();

    print_test_header(
        "test_unsigned_agreement_reports_skipped_years",
        &["Year generation without a signature date answers 200 with a skipped outcome."],
    );

    let institution_id = create_institution(&router).await;
    let (_, _, created) = send(
        &router,
        Method::POST,
        "/agreements",
        Some(json!({ "name": "Unsigned", "institution_id": institution_id, "duration_years": 3 })),
    )
    .await;
    let id = created["agreement"]["id"].as_str().unwrap();

    let (status, _, sync) = send(
        &router,
        Method::POST,
        &format!("/agreements/{}/years/generate", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sync["outcome"], "skipped");
    assert_eq!(sync["reason"], "missing_signature_date");
}

#[tokio::test]
async fn test_validation_and_conflict_problems() {
    let (_ctx, router) = app();

    print_test_header(
        "test_validation_and_conflict_problems",
        &["Bad input maps to 400 and referenced catalog rows to 409."],
    );

    let institution_id = create_institution(&router).await;

    let (status, _, problem) = send(
        &router,
        Method::POST,
        "/agreements",
        Some(json!({ "name": "Bad status", "institution_id": institution_id, "status": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["title"], "Validation Error");

    let (status, _, _) = send(
        &router,
        Method::POST,
        "/agreements",
        Some(json!({ "name": "Valid", "institution_id": institution_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, problem) = send(
        &router,
        Method::DELETE,
        &format!("/institutions/{}", institution_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["title"], "Conflict");
}

#[tokio::test]
async fn test_frozen_mobility_is_409() {
    let (ctx, router) = app();

    print_test_header(
        "test_frozen_mobility_is_409",
        &["Writes to a mobility record after its report was submitted answer 409 Record Frozen."],
    );

    let responsible = ctx.profile("Coordinator", ProfileRole::User).await;
    let institution_id = create_institution(&router).await;
    let (_, _, created) = send(
        &router,
        Method::POST,
        "/agreements",
        Some(json!({ "name": "Exchange", "institution_id": institution_id, "status": "active" })),
    )
    .await;
    let agreement_id = created["agreement"]["id"].as_str().unwrap().to_string();

    let request = json!({
        "agreement_id": agreement_id,
        "responsible_id": responsible.id,
        "participant_name": "Sofía Vargas",
        "participant_kind": "student",
        "direction": "incoming",
        "start_date": "2025-03-01"
    });
    let (status, _, record) = send(&router, Method::POST, "/mobility", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = record["id"].as_str().unwrap().to_string();

    let (status, _, submitted) =
        send(&router, Method::POST, &format!("/mobility/{}/report", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["report_submitted"], true);

    let (status, _, problem) =
        send(&router, Method::PUT, &format!("/mobility/{}", id), Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(problem["title"], "Record Frozen");

    let (_, _, listed) = send(
        &router,
        Method::GET,
        &format!("/mobility?agreement_id={}", agreement_id),
        None,
    )
    .await;
    assert_eq!(listed["total"], 1);

    let (status, _, summary) = send(&router, Method::GET, "/dashboard?today=2025-01-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_agreements"], 1);
    assert_eq!(summary["mobility_by_direction"]["incoming"], 1);
    assert_eq!(summary["pending_mobility_reports"], 0);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (_ctx, router) = app();

    print_test_header(
        "test_openapi_document_is_served",
        &["The component document lists the public schemas."],
    );

    let (status, _, doc) = send(&router, Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["components"]["schemas"]["AgreementDetailDto"].is_object());
    assert!(doc["components"]["schemas"]["MobilityDto"].is_object());
}
