use async_trait::async_trait;
use chrono::Utc;

use hookforge_core::AppResult;
use hookforge_domain::RateRecord;

/// A rate record together with the store version it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedRateRecord {
    /// Stored timestamps.
    pub record: RateRecord,
    /// Store version; `0` when no record exists yet.
    pub version: u64,
}

/// Store port for shared rate records.
///
/// Implementations must make `compare_and_swap` atomic per key: the write
/// happens only when the stored version still equals `expected_version`.
#[async_trait]
pub trait RateRecordStore: Send + Sync {
    /// Loads the record for `key`, or an empty record at version `0`.
    async fn load(&self, key: &str) -> AppResult<VersionedRateRecord>;

    /// Writes `record` if the stored version equals `expected_version`.
    ///
    /// Returns `false` when another writer got there first. `ttl_ms` is a
    /// hint after which an untouched record may be discarded.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: u64,
        record: &RateRecord,
        ttl_ms: i64,
    ) -> AppResult<bool>;
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current epoch time in milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
