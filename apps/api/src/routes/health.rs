use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Server is running"
    }))
}

/// GET /health
/// Returns service identity, version and the current server time.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Server is healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339()
    }))
}
