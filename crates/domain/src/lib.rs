//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod hook;
mod rate_record;

pub use hook::{
    DEFAULT_SAMPLING_TEMPERATURE, HookList, SamplingTemperature, TOPIC_MAX_CHARS, Topic,
};
pub use rate_record::{RateDecision, RateRecord, RateWindow};
