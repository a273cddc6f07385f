use std::sync::Arc;

use tracing::{debug, warn};

use hookforge_core::{AppError, AppResult};
use hookforge_domain::RateDecision;

use crate::hashing::sha256_hex;

use super::config::RateLimitRule;
use super::ports::RateRecordStore;

/// Application service applying one sliding window per client identity.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    store: Arc<dyn RateRecordStore>,
    rule: RateLimitRule,
}

impl SlidingWindowLimiter {
    /// Creates a limiter over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RateRecordStore>, rule: RateLimitRule) -> Self {
        Self { store, rule }
    }

    /// Returns the configured rule.
    #[must_use]
    pub fn rule(&self) -> RateLimitRule {
        self.rule
    }

    /// Atomically prunes the client's record and admits or rejects `now_ms`.
    ///
    /// The pruned record is written back on rejection as well. Conflicting
    /// concurrent writers are retried up to the rule's budget, after which the
    /// check fails with `AppError::StorageUnavailable`.
    pub async fn check_and_record(&self, client_key: &str, now_ms: i64) -> AppResult<RateDecision> {
        if client_key.trim().is_empty() {
            return Err(AppError::Validation(
                "rate limit client key must not be empty".to_owned(),
            ));
        }

        let store_key = hash_client_key(client_key);
        let window = self.rule.window();
        let attempts = self.rule.max_retries().saturating_add(1);

        for attempt in 1..=attempts {
            let mut current = self.store.load(&store_key).await?;
            let decision = window.evaluate(&mut current.record, now_ms);

            let written = self
                .store
                .compare_and_swap(
                    &store_key,
                    current.version,
                    &current.record,
                    window.window_ms(),
                )
                .await?;

            if written {
                debug!(
                    key = %store_key,
                    attempt,
                    allowed = decision.is_allowed(),
                    "rate limit check committed"
                );
                return Ok(decision);
            }

            debug!(key = %store_key, attempt, "rate limit write conflict, retrying");
        }

        warn!(
            key = %store_key,
            attempts,
            "rate limit retry budget exhausted"
        );
        Err(AppError::StorageUnavailable(format!(
            "rate limit record stayed contended after {attempts} attempts"
        )))
    }
}

/// Hashes a client identity so raw addresses never reach the shared store.
pub(super) fn hash_client_key(client_key: &str) -> String {
    sha256_hex(client_key)
}
