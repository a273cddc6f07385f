//! Sliding-window rate limiting ports and application service.
//!
//! Each client identity owns one record of request timestamps in a shared
//! store. Checks run as an optimistic read-modify-write loop against that
//! record so concurrent instances never over-admit a client.

mod config;
mod ports;
mod service;


pub use config::RateLimitRule;
pub use ports::{Clock, RateRecordStore, SystemClock, VersionedRateRecord};
pub use service::SlidingWindowLimiter;
