//! Redis-backed rate record store.

use async_trait::async_trait;
use hookforge_application::{RateRecordStore, VersionedRateRecord};
use hookforge_core::{AppError, AppResult};
use hookforge_domain::RateRecord;
use redis::Script;

// Versions are bumped to at least the server clock in microseconds, so a key
// that expired and was recreated never repeats an older version.
const COMPARE_AND_SWAP_SCRIPT: &str = r#"
local key = KEYS[1]
local expected_version = tonumber(ARGV[1])
local timestamps = ARGV[2]
local ttl_ms = tonumber(ARGV[3])

local stored = redis.call('HGET', key, 'version')
local current_version = 0
if stored then
  current_version = tonumber(stored)
end

if current_version ~= expected_version then
  return 0
end

local time = redis.call('TIME')
local clock_version = tonumber(time[1]) * 1000000 + tonumber(time[2])
local next_version = math.max(current_version + 1, clock_version)

redis.call('HSET', key, 'version', string.format('%.0f', next_version), 'timestamps', timestamps)
redis.call('PEXPIRE', key, ttl_ms)
return 1
"#;

/// Redis implementation of the rate record store port.
///
/// Each record is a hash with a `version` field and a JSON `timestamps` field.
#[derive(Clone)]
pub struct RedisRateRecordStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisRateRecordStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| {
                AppError::StorageUnavailable(format!("failed to connect to redis: {error}"))
            })
    }
}

#[async_trait]
impl RateRecordStore for RedisRateRecordStore {
    async fn load(&self, key: &str) -> AppResult<VersionedRateRecord> {
        let redis_key = self.key_for(key);
        let mut connection = self.connection().await?;

        let (version, timestamps): (Option<u64>, Option<String>) = redis::cmd("HMGET")
            .arg(redis_key.as_str())
            .arg("version")
            .arg("timestamps")
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::StorageUnavailable(format!("failed to load rate record: {error}"))
            })?;

        let record = match timestamps {
            Some(json) => serde_json::from_str::<RateRecord>(&json).map_err(|error| {
                AppError::Internal(format!(
                    "invalid rate record stored at '{redis_key}': {error}"
                ))
            })?,
            None => RateRecord::new(),
        };

        Ok(VersionedRateRecord {
            record,
            version: version.unwrap_or(0),
        })
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: u64,
        record: &RateRecord,
        ttl_ms: i64,
    ) -> AppResult<bool> {
        if ttl_ms <= 0 {
            return Err(AppError::Validation(
                "rate record ttl must be greater than zero".to_owned(),
            ));
        }

        let timestamps = serde_json::to_string(record).map_err(|error| {
            AppError::Internal(format!("failed to encode rate record: {error}"))
        })?;

        let mut connection = self.connection().await?;
        let script = Script::new(COMPARE_AND_SWAP_SCRIPT);
        let written: i32 = script
            .key(self.key_for(key))
            .arg(expected_version)
            .arg(timestamps)
            .arg(ttl_ms)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::StorageUnavailable(format!("failed to write rate record: {error}"))
            })?;

        Ok(written == 1)
    }
}
