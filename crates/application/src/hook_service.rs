//! Hook generation application service.

use std::sync::Arc;

use tracing::{error, info};

use hookforge_core::{AppError, AppResult};
use hookforge_domain::{HookList, RateDecision, SamplingTemperature, Topic};

use crate::pro_tier::ProTierVerifier;
use crate::rate_limit_service::{Clock, SlidingWindowLimiter};
use crate::text_generation_ports::TextGenerator;


/// Input for one hook generation request.
#[derive(Debug, Clone, Default)]
pub struct GenerateHooksInput {
    /// Raw topic as supplied by the caller.
    pub topic: Option<String>,
    /// Optional pro tier token.
    pub pro_token: Option<String>,
}

/// Hooks produced for one admitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHooks {
    /// Parsed hooks in generation order.
    pub hooks: HookList,
    /// Pro tier flag, present only when a token was supplied.
    pub is_pro: Option<bool>,
    /// Requests the client may still make in the current window.
    pub remaining: u32,
}

/// Application service that rate limits callers and generates hooks.
#[derive(Clone)]
pub struct HookService {
    limiter: SlidingWindowLimiter,
    generator: Arc<dyn TextGenerator>,
    pro_tier: ProTierVerifier,
    clock: Arc<dyn Clock>,
    temperature: SamplingTemperature,
}

impl HookService {
    /// Creates a hook service.
    #[must_use]
    pub fn new(
        limiter: SlidingWindowLimiter,
        generator: Arc<dyn TextGenerator>,
        pro_tier: ProTierVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limiter,
            generator,
            pro_tier,
            clock,
            temperature: SamplingTemperature::default(),
        }
    }

    /// Overrides the sampling temperature passed to the generator.
    #[must_use]
    pub fn with_temperature(mut self, temperature: SamplingTemperature) -> Self {
        self.temperature = temperature;
        self
    }

    /// Validates the request, consumes one slot for `client_key` and generates hooks.
    ///
    /// The slot stays consumed when generation fails afterwards.
    pub async fn generate_hooks(
        &self,
        client_key: &str,
        input: GenerateHooksInput,
    ) -> AppResult<GeneratedHooks> {
        let topic = Topic::new(input.topic.as_deref().unwrap_or_default())?;
        let is_pro = self.pro_tier.resolve(input.pro_token.as_deref());

        let now_ms = self.clock.now_ms();
        let remaining = match self.limiter.check_and_record(client_key, now_ms).await? {
            RateDecision::Allowed { remaining } => remaining,
            RateDecision::Rejected { reset_at_ms } => {
                info!(
                    reset_at_ms,
                    max_requests = self.limiter.rule().window().max_requests(),
                    "hook generation rate limited"
                );
                return Err(AppError::RateLimited { reset_at_ms });
            }
        };

        let text = self
            .generator
            .generate(&topic.hook_prompt(), self.temperature)
            .await
            .inspect_err(|error| error!(%error, "hook generation failed"))?;

        let hooks = HookList::parse(&text);
        if hooks.is_empty() {
            error!("hook generation returned no usable lines");
            return Err(AppError::Upstream(
                "text generation returned no hooks".to_owned(),
            ));
        }

        info!(count = hooks.as_slice().len(), ?is_pro, "hooks generated");

        Ok(GeneratedHooks {
            hooks,
            is_pro,
            remaining,
        })
    }
}
