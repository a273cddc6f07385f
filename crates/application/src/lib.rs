//! Application services and ports.

#![forbid(unsafe_code)]

mod hashing;
mod hook_service;
mod pro_tier;
mod rate_limit_service;
mod text_generation_ports;

pub use hook_service::{GenerateHooksInput, GeneratedHooks, HookService};
pub use pro_tier::{ProTierVerifier, hash_token};
pub use rate_limit_service::{
    Clock, RateLimitRule, RateRecordStore, SlidingWindowLimiter, SystemClock,
    VersionedRateRecord,
};
pub use text_generation_ports::TextGenerator;
