use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use hookforge_application::GenerateHooksInput;
use hookforge_core::AppError;

use crate::client_identity::ClientIdentity;
use crate::dto::{GenerateHooksRequest, GenerateHooksResponse};
use crate::error::{ApiResult, ErrorResponse};
use crate::state::AppState;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

pub async fn generate_hooks_handler(
    State(state): State<AppState>,
    client: ClientIdentity,
    payload: Result<Json<GenerateHooksRequest>, JsonRejection>,
) -> ApiResult<([(&'static str, String); 1], Json<GenerateHooksResponse>)> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let generated = state
        .hook_service
        .generate_hooks(
            client.as_str(),
            GenerateHooksInput {
                topic: payload.topic,
                pro_token: payload.pro_token,
            },
        )
        .await?;

    Ok((
        [(RATE_LIMIT_REMAINING_HEADER, generated.remaining.to_string())],
        Json(GenerateHooksResponse::from(generated)),
    ))
}

pub async fn method_not_allowed_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed".to_owned())),
    )
}

pub async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found".to_owned())),
    )
}
