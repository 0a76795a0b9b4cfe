use axum_bookstore_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");
    assert!(response.0.meta.is_none());
    assert!(response.0.data.is_some());
}

#[tokio::test]
async fn health_check_serializes_status() {
    let response = health_check().await;
    let json = serde_json::to_value(&response.0).expect("serialize");
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"], serde_json::Value::Null);
}
