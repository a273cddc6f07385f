//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod gemini_text_generator;
mod in_memory_rate_record_store;
mod redis_rate_record_store;

pub use gemini_text_generator::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiTextGenerator,
};
pub use in_memory_rate_record_store::InMemoryRateRecordStore;
pub use redis_rate_record_store::RedisRateRecordStore;
