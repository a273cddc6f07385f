use async_trait::async_trait;

use hookforge_core::AppResult;
use hookforge_domain::SamplingTemperature;

/// Port for the opaque text-completion collaborator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a block of text for one prompt.
    ///
    /// Failures are reported as `AppError::Upstream`.
    async fn generate(&self, prompt: &str, temperature: SamplingTemperature)
    -> AppResult<String>;
}
