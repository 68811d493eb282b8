use axum::Json;
use serde_json::{json, Value};

/// GET /healthz
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "screening-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
