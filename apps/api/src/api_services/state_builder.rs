use std::sync::Arc;
use std::time::Duration;

use hookforge_application::{
    HookService, ProTierVerifier, RateRecordStore, SlidingWindowLimiter, SystemClock,
};
use hookforge_core::AppError;
use hookforge_infrastructure::{
    GeminiConfig, GeminiTextGenerator, InMemoryRateRecordStore, RedisRateRecordStore,
};
use tracing::info;

use crate::api_config::{ApiConfig, RateLimitStoreConfig};
use crate::state::AppState;

use super::redis::build_redis_client;

const RATE_LIMIT_KEY_PREFIX: &str = "hookforge:rate_limit";
const GENERATION_RETRY_BACKOFF_MS: u64 = 250;

pub fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = match config.rate_limit_store {
        RateLimitStoreConfig::Redis => config
            .redis_url
            .as_deref()
            .map(build_redis_client)
            .transpose()?,
        RateLimitStoreConfig::InMemory => None,
    };

    let store: Arc<dyn RateRecordStore> = match redis_client.clone() {
        Some(client) => {
            info!("rate limit store: redis");
            Arc::new(RedisRateRecordStore::new(client, RATE_LIMIT_KEY_PREFIX))
        }
        None => {
            info!("rate limit store: in-memory");
            Arc::new(InMemoryRateRecordStore::new())
        }
    };

    let limiter = SlidingWindowLimiter::new(store, config.rate_limit_rule()?);

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.generation_timeout_seconds.max(1)))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let generator = GeminiTextGenerator::new(
        http_client,
        GeminiConfig {
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
            max_attempts: config.generation_max_attempts,
            retry_backoff_ms: GENERATION_RETRY_BACKOFF_MS,
        },
    );

    let hook_service = HookService::new(
        limiter,
        Arc::new(generator),
        ProTierVerifier::new(&config.pro_token_hashes),
        Arc::new(SystemClock),
    )
    .with_temperature(config.generation_temperature);

    Ok(AppState {
        hook_service,
        redis_client,
        trusted_proxies: Arc::new(config.trusted_proxies.clone()),
    })
}
