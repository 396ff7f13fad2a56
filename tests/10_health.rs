mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn root_describes_service() {
    let app = TestApp::new();
    let res = app.get("/", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["data"]["name"], "ProjectHub API");
}

#[tokio::test]
async fn health_reports_in_memory_store() {
    let app = TestApp::new();
    let res = app.get("/health", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["status"], "ok");
    assert_eq!(res.body["data"]["database"], "in-memory");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = TestApp::new();
    let res = app.get("/api/nope", None).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
