mod checks;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{HealthDependencyStatus, HealthResponse};
use crate::state::AppState;

use checks::check_store;

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = check_store(state.redis_client.clone()).await;

    let ready = store.status != "error";
    let status = if ready { "ok" } else { "degraded" };
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(HealthResponse { status, store }))
}

fn dependency_status(status: &'static str, detail: Option<String>) -> HealthDependencyStatus {
    HealthDependencyStatus { status, detail }
}
