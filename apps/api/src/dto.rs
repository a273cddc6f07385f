use hookforge_application::GeneratedHooks;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: HealthDependencyStatus,
}

/// Health status of one dependency.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub detail: Option<String>,
}

/// Incoming payload for hook generation.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generate-hooks-request.ts"
)]
pub struct GenerateHooksRequest {
    #[serde(default)]
    #[ts(optional)]
    pub topic: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub pro_token: Option<String>,
}

/// Generated hooks returned to the caller.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generate-hooks-response.ts"
)]
pub struct GenerateHooksResponse {
    pub hooks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub is_pro: Option<bool>,
}

impl From<GeneratedHooks> for GenerateHooksResponse {
    fn from(value: GeneratedHooks) -> Self {
        Self {
            hooks: value.hooks.into_vec(),
            is_pro: value.is_pro,
        }
    }
}
