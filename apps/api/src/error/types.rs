use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    error: String,
    /// Epoch milliseconds at which a rate limited client may retry.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    retry_after: Option<i64>,
}

impl ErrorResponse {
    pub(crate) fn new(error: String) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }

    pub(super) fn rate_limited(error: String, retry_after: i64) -> Self {
        Self {
            error,
            retry_after: Some(retry_after),
        }
    }
}
