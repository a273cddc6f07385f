use hookforge_core::{AppError, AppResult};
use hookforge_domain::RateWindow;

/// Default number of compare-and-swap retries after a write conflict.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Configuration for the sliding-window limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    window: RateWindow,
    max_retries: u32,
}

impl RateLimitRule {
    /// Creates a validated rule with the default retry budget.
    pub fn new(max_requests: u32, window_ms: i64) -> AppResult<Self> {
        Ok(Self {
            window: RateWindow::new(max_requests, window_ms)?,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Overrides the number of retries after a conflicting concurrent write.
    pub fn with_max_retries(mut self, max_retries: u32) -> AppResult<Self> {
        if max_retries > 100 {
            return Err(AppError::Validation(
                "rate limit max_retries must be at most 100".to_owned(),
            ));
        }

        self.max_retries = max_retries;
        Ok(self)
    }

    /// Capacity and window applied to every client.
    #[must_use]
    pub fn window(&self) -> RateWindow {
        self.window
    }

    /// Retries allowed after the first conflicting write.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
