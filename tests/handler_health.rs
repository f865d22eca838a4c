mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_context();
    let server = ctx.server();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["mapping_store"]["status"], "ok");
    assert_eq!(json["checks"]["counter_store"]["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_health_degraded_when_counter_store_down() {
    let ctx = common::create_test_context();
    let server = ctx.server();

    ctx.counters.set_down(true);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["mapping_store"]["status"], "ok");
    assert_eq!(json["checks"]["counter_store"]["status"], "error");
}
