use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "app": "ChangePost",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
