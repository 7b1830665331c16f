#![allow(clippy::unwrap_used, clippy::expect_used)]

//! HTTP-level tests for the prescriptions router.
//!
//! The router runs without the gateway here, so each request carries an
//! anonymous `SecurityContext` the way the pipeline would insert it.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use medrx_security::SecurityContext;
use prescriptions::{
    AccessCatalog, AccessCatalogConfig, DatabaseConfig, InteractionClient, InteractionError,
    PrescriptionsModule, SeaOrmPrescriptionRepository,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct FixedInteractions(Option<Value>);

#[async_trait]
impl InteractionClient for FixedInteractions {
    async fn fetch(&self) -> Result<Value, InteractionError> {
        self.0
            .clone()
            .ok_or_else(|| InteractionError::Transport("connection refused".to_owned()))
    }
}

async fn app_with(interactions: FixedInteractions) -> Router {
    let db = prescriptions::infra::storage::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_owned(),
        run_migrations: true,
    })
    .await
    .unwrap();
    PrescriptionsModule::from_parts(
        SeaOrmPrescriptionRepository::new(db),
        Arc::new(interactions),
        AccessCatalog::from_config(&AccessCatalogConfig::default()),
    )
    .router()
}

async fn app() -> Router {
    app_with(FixedInteractions(Some(json!({"nlmRxImpact": "ok"})))).await
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-request-id", "rid-test")
        .extension(SecurityContext::anonymous());
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn prescription(date: &str, name: &str) -> Value {
    json!({
        "prescriptionDate": date,
        "name": name,
        "age": 41,
        "gender": "Male",
        "diagnosis": "Type 2 diabetes",
        "medicines": "Metformin 500mg",
        "nextVisitDate": "2024-04-30"
    })
}

#[tokio::test]
async fn create_returns_created_envelope() {
    let app = app().await;

    let (status, body) = call(
        &app,
        request(
            Method::POST,
            "/prescriptions",
            Some(prescription("2024-04-01", "Hasan")),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"status": 201, "message": "Prescription Created"}));
}

#[tokio::test]
async fn created_prescription_is_found_in_camel_case() {
    let app = app().await;
    call(
        &app,
        request(
            Method::POST,
            "/prescriptions",
            Some(prescription("2024-04-01", "Hasan")),
        ),
    )
    .await;

    let (status, body) = call(&app, request(Method::GET, "/prescription/1", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prescription Found");
    assert_eq!(body["data"]["prescriptionDate"], "2024-04-01");
    assert_eq!(body["data"]["nextVisitDate"], "2024-04-30");
    assert_eq!(body["data"]["name"], "Hasan");
}

#[tokio::test]
async fn blank_field_is_bad_request_problem() {
    let app = app().await;
    let mut body = prescription("2024-04-01", "Hasan");
    body["diagnosis"] = json!("");

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/prescriptions", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/prescriptions")
        .header(header::CONTENT_TYPE, "application/json")
        .extension(SecurityContext::anonymous())
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = call(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["instance"], "/prescriptions");
}

#[tokio::test]
async fn unknown_prescription_is_not_found_problem() {
    let app = app().await;

    let (status, body) = call(&app, request(Method::GET, "/prescription/42", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Prescription not found with id: 42");
    assert_eq!(body["instance"], "/prescription/42");
    assert_eq!(body["trace_id"], "rid-test");

    let (status, _) = call(&app, request(Method::DELETE, "/prescriptions/42", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request_problem() {
    let app = app().await;
    let cases = [
        request(Method::GET, "/prescription/abc", None),
        request(Method::DELETE, "/prescriptions/abc", None),
        request(
            Method::PATCH,
            "/prescriptions/abc",
            Some(json!({"name": "Hasan", "age": 41})),
        ),
    ];

    for req in cases {
        let uri = req.uri().path().to_owned();
        let response = app.clone().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json",
            "{uri}"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["instance"], uri.as_str());
        assert_eq!(body["trace_id"], "rid-test");
    }
}

#[tokio::test]
async fn patch_then_delete() {
    let app = app().await;
    call(
        &app,
        request(
            Method::POST,
            "/prescriptions",
            Some(prescription("2024-04-01", "Hasan")),
        ),
    )
    .await;

    let (status, body) = call(
        &app,
        request(
            Method::PATCH,
            "/prescriptions/1",
            Some(json!({
                "name": "Hasan Ali",
                "age": 42,
                "gender": "Male",
                "diagnosis": "Type 2 diabetes",
                "medicines": "Metformin 1000mg"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prescription Updated");

    let (_, found) = call(&app, request(Method::GET, "/prescription/1", None)).await;
    assert_eq!(found["data"]["medicines"], "Metformin 1000mg");
    assert_eq!(found["data"]["nextVisitDate"], Value::Null);

    let (status, body) = call(&app, request(Method::DELETE, "/prescriptions/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prescription Deleted");
}

#[tokio::test]
async fn list_pages_and_filters() {
    let app = app().await;
    for (date, name) in [
        ("2024-01-10", "a"),
        ("2024-02-10", "b"),
        ("2024-02-20", "c"),
        ("2024-03-01", "d"),
    ] {
        let mut body = prescription(date, name);
        body["nextVisitDate"] = Value::Null;
        call(&app, request(Method::POST, "/prescriptions", Some(body))).await;
    }

    let (status, body) = call(
        &app,
        request(Method::GET, "/prescription?page=2&size=3", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 4);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["content"].as_array().unwrap().len(), 1);

    let (_, body) = call(
        &app,
        request(
            Method::GET,
            "/prescription?startDate=2024-02-01&endDate=2024-02-29",
            None,
        ),
    )
    .await;
    assert_eq!(body["totalElements"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["size"], 10);
}

#[tokio::test]
async fn invalid_list_queries_are_rejected() {
    let app = app().await;
    for uri in [
        "/prescription?page=0",
        "/prescription?size=101",
        "/prescription?startDate=2024-02-01",
        "/prescription?startDate=2024-03-01&endDate=2024-02-01",
        "/prescription?startDate=yesterday&endDate=2024-02-01",
    ] {
        let (status, _) = call(&app, request(Method::GET, uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn report_uses_day_month_year() {
    let app = app().await;
    for date in ["2024-05-02", "2024-05-02", "2024-05-01"] {
        let mut body = prescription(date, "x");
        body["nextVisitDate"] = json!("2024-06-01");
        call(&app, request(Method::POST, "/prescriptions", Some(body))).await;
    }

    let (status, body) = call(&app, request(Method::GET, "/report", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"date": "01-05-2024", "count": 1},
            {"date": "02-05-2024", "count": 2}
        ])
    );
}

#[tokio::test]
async fn posts_wraps_upstream_body() {
    let app = app().await;

    let (status, body) = call(&app, request(Method::GET, "/posts", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": 200, "message": "Success", "data": {"nlmRxImpact": "ok"}})
    );
}

#[tokio::test]
async fn posts_upstream_failure_is_bad_gateway() {
    let app = app_with(FixedInteractions(None)).await;

    let (status, body) = call(&app, request(Method::GET, "/posts", None)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);
}

#[tokio::test]
async fn public_catalog_and_docs() {
    let app = app().await;

    let (status, roles) = call(&app, request(Method::GET, "/api/v1/roles", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles[0]["name"], "DOCTOR");

    let (_, permissions) = call(&app, request(Method::GET, "/api/v1/permission", None)).await;
    assert!(
        permissions
            .as_array()
            .unwrap()
            .contains(&json!("report:read"))
    );

    let (_, privileges) = call(&app, request(Method::GET, "/api/v1/privileges", None)).await;
    assert!(privileges.as_array().unwrap().iter().any(|p| {
        p["permission"] == "prescription:read" && p["roles"] == json!(["ASSISTANT", "DOCTOR"])
    }));

    let (status, welcome) = call(&app, request(Method::GET, "/api/v1/users/welcome", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(welcome["status"], 200);

    let (status, docs) = call(&app, request(Method::GET, "/v3/api-docs", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(docs["paths"]["/prescriptions/{id}"].is_object());
}
